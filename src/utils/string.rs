/// Extracts the file name out of a URL, ignoring any query or fragment
pub fn filename_from_url(url: &str) -> &str {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    let path = match url.find("://") {
        Some(scheme_end) => {
            let after_authority = &url[scheme_end + 3..];
            match after_authority.find('/') {
                Some(path_start) => &after_authority[path_start..],
                None => "",
            }
        }
        None => url,
    };
    path.rsplit('/').next().unwrap_or_default()
}
