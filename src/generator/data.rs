use serde::Serialize;

#[derive(Serialize, Debug)]
pub(super) struct PostPageData {
    pub page_title: String,
    pub date: String,
    pub body: String,
    pub root: String,
}

#[derive(Serialize, Debug)]
pub(super) struct BlogPageData {
    pub page_title: String,
    pub root: String,
}
