use crate::{markup, nav::PageLocation};

pub(crate) const DROPDOWN_SCRIPT: &str = include_str!("../js/dropdown.js");

/// Root-relative output path of the dropdown script.
pub(crate) const DROPDOWN_SCRIPT_PATH: &str = "js/dropdown.js";

/// Adds the dropdown script to a page unless the page already loads it.
pub(crate) fn reference_dropdown_script(page: &str, location: &PageLocation) -> String {
    if page.contains(DROPDOWN_SCRIPT_PATH) {
        return page.to_string();
    }
    let tag = format!(
        "<script src=\"{}{DROPDOWN_SCRIPT_PATH}\" defer></script>",
        location.root_prefix()
    );
    markup::insert_before_body_close(page, &tag)
}
