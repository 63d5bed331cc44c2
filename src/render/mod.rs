use tera::Tera;

const JOBS_TEMPLATE: &str = include_str!("jobs.html");
const JOB_TEMPLATE: &str = include_str!("job.html");

/// The template rendered for a whole feed. `job.html` is pulled in per
/// entry by an include and is never rendered on its own.
pub(crate) const FEED_TEMPLATE: &str = "jobs.html";

/// Builds the template environment from the embedded templates.
///
/// Nothing is loaded from disk; the widget ships its markup the same way
/// it ships its code.
pub(crate) fn environment() -> Tera {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (FEED_TEMPLATE, JOBS_TEMPLATE),
        ("job.html", JOB_TEMPLATE),
    ])
    .expect("Embedded templates should have been valid");
    tera
}
