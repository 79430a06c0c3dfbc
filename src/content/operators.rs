//! The standard PDF 1.7 content-stream operator set and its operand-arity table
//! (§4.7, referenced by the inline-image end-detection heuristic's arity check).

/// Fixed arity (`Some(n)`) or variable arity (`None`, e.g. `SCN`/`TJ`-style operators
/// whose operand count depends on the current color space or array contents).
pub fn operand_arity(op: &str) -> Option<usize> {
    match op {
        // Graphics state
        "q" | "Q" => Some(0),
        "cm" => Some(6),
        "w" | "J" | "j" | "M" | "ri" | "i" => Some(1),
        "gs" => Some(1),
        "d" => Some(2),
        // Path construction
        "m" | "l" => Some(2),
        "c" => Some(6),
        "v" | "y" => Some(4),
        "h" => Some(0),
        "re" => Some(4),
        // Path painting
        "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" | "n" => Some(0),
        "W" | "W*" => Some(0),
        // Color
        "CS" | "cs" => Some(1),
        "SC" | "sc" | "SCN" | "scn" => None,
        "G" | "g" => Some(1),
        "RG" | "rg" => Some(3),
        "K" | "k" => Some(4),
        // Text objects / state
        "BT" | "ET" => Some(0),
        "Tc" | "Tw" | "Tz" | "TL" | "Ts" => Some(1),
        "Tf" => Some(2),
        "Tr" => Some(1),
        "Td" | "TD" => Some(2),
        "Tm" => Some(6),
        "T*" => Some(0),
        "Tj" | "'" => Some(1),
        "\"" => Some(3),
        "TJ" => Some(1),
        // XObjects / marked content / compatibility / shading / inline images
        "Do" => Some(1),
        "MP" | "BMC" => Some(1),
        "DP" | "BDC" => Some(2),
        "EMC" => Some(0),
        "BX" | "EX" => Some(0),
        "sh" => Some(1),
        "BI" | "ID" | "EI" => Some(0),
        // Type 3 font metrics
        "d0" => Some(2),
        "d1" => Some(6),
        _ => None,
    }
}

/// Whether `op` is a recognized standard operator at all (used by the inline-image
/// heuristic's "is this really the next operator" check).
pub fn is_known_operator(op: &str) -> bool {
    operand_arity(op).is_some() || matches!(op, "SC" | "sc" | "SCN" | "scn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_arity_examples() {
        assert_eq!(operand_arity("cm"), Some(6));
        assert_eq!(operand_arity("re"), Some(4));
        assert_eq!(operand_arity("Tj"), Some(1));
    }

    #[test]
    fn variable_arity_color_ops() {
        assert_eq!(operand_arity("scn"), None);
        assert!(is_known_operator("scn"));
    }

    #[test]
    fn unknown_operator() {
        assert!(!is_known_operator("Zzz"));
    }
}
