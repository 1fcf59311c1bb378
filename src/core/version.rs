use tracing::trace;

/// Picks the greatest stable release among `labels`.
///
/// Labels that are not valid semver are skipped, as are pre-releases. Returns
/// `None` when nothing is left.
pub fn select_latest<'a, I>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut latest: Option<semver::Version> = None;
    for label in labels {
        let version = match semver::Version::parse(label) {
            Ok(version) => version,
            Err(err) => {
                trace!(label, %err, "skipping unparsable version");
                continue;
            }
        };
        if !version.pre.is_empty() {
            continue;
        }
        if latest.as_ref().map_or(true, |current| version > *current) {
            latest = Some(version);
        }
    }
    latest.map(|version| version.to_string())
}
