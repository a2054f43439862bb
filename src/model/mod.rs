crate::using! {
    pub artifact,
    pub release,
}
