//! Homepage metadata, local only

use crate::model::SiteMetadata;
use crate::page::DomSnapshot;

/// Title, description, language, charset and generator from the parsed homepage
pub fn extract(dom: &DomSnapshot) -> SiteMetadata {
    SiteMetadata {
        title: non_empty(dom.title.as_deref()),
        description: non_empty(dom.meta_content("description")),
        language: non_empty(dom.lang.as_deref()),
        charset: non_empty(dom.charset()),
        generator: non_empty(dom.generator()),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
