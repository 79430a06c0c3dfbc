//! The trailer `/Info` dictionary: author-facing document metadata, independent of the
//! object graph it describes.

use crate::date::OffsetDateTime;
use crate::object::{name, Dict, Object, StringFormat};
use crate::utils::to_pdf_time_stamp_metadata;

#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: Vec<String>,
    pub creator: String,
    pub producer: String,
    pub creation_date: OffsetDateTime,
    pub modification_date: OffsetDateTime,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        let now = OffsetDateTime::now_utc();
        DocumentInfo {
            title: String::new(),
            author: String::new(),
            subject: String::new(),
            keywords: Vec::new(),
            creator: String::new(),
            producer: "pdf_engine".to_string(),
            creation_date: now,
            modification_date: now,
        }
    }
}

impl DocumentInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_dict(&self) -> Dict {
        let lit = |s: &str| Object::String(s.as_bytes().to_vec(), StringFormat::Literal);
        let mut d = Dict::new();
        d.insert(name("Title"), lit(&self.title));
        d.insert(name("Author"), lit(&self.author));
        d.insert(name("Subject"), lit(&self.subject));
        d.insert(name("Keywords"), lit(&self.keywords.join(", ")));
        d.insert(name("Creator"), lit(&self.creator));
        d.insert(name("Producer"), lit(&self.producer));
        d.insert(name("CreationDate"), lit(&to_pdf_time_stamp_metadata(&self.creation_date)));
        d.insert(name("ModDate"), lit(&to_pdf_time_stamp_metadata(&self.modification_date)));
        d
    }

    pub fn from_dict(dict: &Dict) -> Self {
        let text = |key: &str| {
            dict.get(key)
                .and_then(|o| o.as_str_bytes())
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default()
        };
        let mut info = DocumentInfo::default();
        info.title = text("Title");
        info.author = text("Author");
        info.subject = text("Subject");
        info.keywords = text("Keywords").split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        info.creator = text("Creator");
        info.producer = text("Producer");
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_dict() {
        let mut info = DocumentInfo::new();
        info.title = "A Report".into();
        info.author = "A. Author".into();
        let dict = info.to_dict();
        let back = DocumentInfo::from_dict(&dict);
        assert_eq!(back.title, "A Report");
        assert_eq!(back.author, "A. Author");
    }
}
