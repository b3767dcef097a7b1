use std::sync::LazyLock;

use regex::Regex;

const ORKG_WEB_BASE: &str = "https://orkg.org";

static CLASS_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^C\d+$").unwrap());
static RESOURCE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^R\d+$").unwrap());
static TRAILING_RESOURCE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(R\d+)$").unwrap());

/// Link to the ORKG page for creating a new resource of the given class.
/// Ids outside the class shape get no link.
pub fn create_resource_link(class_id: &str) -> Option<String> {
    CLASS_ID
        .is_match(class_id)
        .then(|| format!("{}/resources/create?classes={}", ORKG_WEB_BASE, class_id))
}

/// Link to the ORKG page of a resource.
pub fn resource_link(resource_id: &str) -> Option<String> {
    RESOURCE_ID
        .is_match(resource_id)
        .then(|| format!("{}/resource/{}", ORKG_WEB_BASE, resource_id))
}

/// Extracts a resource id from the tail of an IRI and links to its page.
pub fn resource_link_from_iri(iri: &str) -> Option<String> {
    TRAILING_RESOURCE_ID
        .captures(iri)
        .and_then(|captures| captures.get(1))
        .map(|id| format!("{}/resource/{}", ORKG_WEB_BASE, id.as_str()))
}
