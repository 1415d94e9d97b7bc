use remote_jobs_digest::filter::DEFAULT_EXCLUDE;
use remote_jobs_digest::FilterPolicy;

const TITLES: &[&str] = &[
    "Senior Rust Engineer",
    "Frontend Developer",
    "Product Designer",
    "DevOps ENGINEER (Contract)",
    "Growth Marketer",
];
const COMPANIES: &[&str] = &["Acme", "Beijing Labs", "Unknown", ""];
const LOCATIONS: &[&str] = &["Remote", "Worldwide", "Hong Kong", "Shanghai, PRC"];
const DESCRIPTIONS: &[&str] = &[
    "",
    "We need a developer",
    "Office in Shenzhen",
    "Build APIs in Rust",
];

fn each_case(mut f: impl FnMut(&str, &str, &str, &str)) {
    for t in TITLES {
        for c in COMPANIES {
            for l in LOCATIONS {
                for d in DESCRIPTIONS {
                    f(t, c, l, d);
                }
            }
        }
    }
}

#[test]
fn excluded_text_is_never_allowed() {
    let policy = FilterPolicy::default();
    each_case(|t, c, l, d| {
        let blob = format!("{t} {c} {l} {d}").to_lowercase();
        if DEFAULT_EXCLUDE.iter().any(|k| blob.contains(k)) {
            assert!(!policy.is_allowed(t, c, l, d), "{blob}");
        }
    });
}

#[test]
fn allowed_jobs_always_match_an_include_keyword() {
    let policy = FilterPolicy::from_keywords("developer,engineer,rust");
    let mut allowed = 0;
    each_case(|t, c, l, d| {
        if policy.is_allowed(t, c, l, d) {
            allowed += 1;
            let text = format!("{t} {d}").to_lowercase();
            assert!(policy.include().iter().any(|k| text.contains(k.as_str())), "{text}");
        }
    });
    assert!(allowed > 0);
}

#[test]
fn allowed_is_exactly_not_excluded_and_matched() {
    let policy = FilterPolicy::default();
    each_case(|t, c, l, d| {
        assert_eq!(
            policy.is_allowed(t, c, l, d),
            !policy.is_excluded(t, c, l, d) && policy.matches_keywords(t, d)
        );
    });
}
