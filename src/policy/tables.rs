use crate::policy::site_policy::BlockCategory;

// ============================================================================
// Default site tables. Content-independent: these answer "should this
// domain ever be considered", not "is this a form".
// ============================================================================

/// Dedicated form-hosting domains — always allowed, and a page on one is a
/// primary-form page by definition.
pub const FORM_HOSTS: &[&str] = &[
    "forms.gle",
    "forms.office.com",
    "surveymonkey.com",
    "typeform.com",
    "jotform.com",
    "wufoo.com",
    "formstack.com",
    "airtable.com",
    "qualtrics.com",
    "tally.so",
];

/// Path-scoped exceptions that override an otherwise-blocked domain.
/// An empty prefix list means the entire domain is excepted.
pub const EXCEPTIONS: &[(&str, &[&str])] = &[
    ("twitter.com", &["/i/flow/login", "/i/flow/signup", "/login", "/signup"]),
    ("x.com", &["/i/flow/login", "/i/flow/signup", "/login", "/signup"]),
    ("facebook.com", &["/login", "/reg", "/recover"]),
    ("instagram.com", &["/accounts/login", "/accounts/emailsignup"]),
    ("reddit.com", &["/login", "/register"]),
    ("youtube.com", &["/signin"]),
    ("linkedin.com", &["/login", "/signup", "/checkpoint"]),
    ("docs.google.com", &["/forms"]),
    ("amazon.com", &["/ap/signin", "/ap/register", "/gp/buy"]),
];

/// Categorized domain blocklist. Matching covers subdomains.
pub const BLOCKLIST: &[(&str, BlockCategory)] = &[
    ("twitter.com", BlockCategory::Social),
    ("x.com", BlockCategory::Social),
    ("facebook.com", BlockCategory::Social),
    ("instagram.com", BlockCategory::Social),
    ("reddit.com", BlockCategory::Social),
    ("tiktok.com", BlockCategory::Social),
    ("pinterest.com", BlockCategory::Social),
    ("youtube.com", BlockCategory::Video),
    ("netflix.com", BlockCategory::Video),
    ("twitch.tv", BlockCategory::Video),
    ("vimeo.com", BlockCategory::Video),
    ("hulu.com", BlockCategory::Video),
    ("cnn.com", BlockCategory::News),
    ("bbc.com", BlockCategory::News),
    ("bbc.co.uk", BlockCategory::News),
    ("nytimes.com", BlockCategory::News),
    ("theguardian.com", BlockCategory::News),
    ("amazon.com", BlockCategory::Shopping),
    ("ebay.com", BlockCategory::Shopping),
    ("aliexpress.com", BlockCategory::Shopping),
    ("docs.google.com", BlockCategory::Productivity),
    ("notion.so", BlockCategory::Productivity),
    ("office.com", BlockCategory::Productivity),
    ("figma.com", BlockCategory::Productivity),
    ("trello.com", BlockCategory::Productivity),
    ("mail.google.com", BlockCategory::Email),
    ("outlook.live.com", BlockCategory::Email),
    ("mail.yahoo.com", BlockCategory::Email),
    ("steampowered.com", BlockCategory::Gaming),
    ("roblox.com", BlockCategory::Gaming),
    ("epicgames.com", BlockCategory::Gaming),
    ("wikipedia.org", BlockCategory::Other),
];

/// Domain-scoped blocked paths: the domain is generally allowed, but these
/// path prefixes are not worth assisting.
pub const BLOCKED_PATHS: &[(&str, &[&str])] = &[
    ("github.com", &["/search", "/notifications"]),
    ("stackoverflow.com", &["/search"]),
    ("google.com", &["/search", "/maps"]),
    ("duckduckgo.com", &["/"]),
    ("bing.com", &["/search"]),
];
