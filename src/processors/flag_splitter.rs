/// The three single-character codes packed into a GHCN `*_ATTRIBUTES` field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecipFlags {
    pub mflag: String,
    pub qflag: String,
    pub sflag: String,
}

/// Split an attribute string of the form `MFLAG,QFLAG,SFLAG`.
///
/// Missing parts become empty strings, parts beyond the third are ignored
/// and every part is trimmed. `None` (attribute column absent or empty cell)
/// yields three empty flags. Never fails.
pub fn split_flags(attributes: Option<&str>) -> PrecipFlags {
    let mut parts = attributes.unwrap_or("").split(',').map(str::trim);

    let mut next = || parts.next().unwrap_or("").to_string();
    let mflag = next();
    let qflag = next();
    let sflag = next();

    PrecipFlags {
        mflag,
        qflag,
        sflag,
    }
}
