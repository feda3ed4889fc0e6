// ============================================================================
// Declarative archetype table. Declaration order matters: the classifier
// keeps the first-declared archetype on score ties.
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Archetype {
    /// Reported form type, e.g. "login form"
    pub name: &'static str,
    pub purpose: &'static str,
    /// Matched against container id/class/action, page title and url
    pub keywords: &'static [&'static str],
    /// Field tokens that practically define the archetype
    pub required_fields: &'static [&'static str],
    /// Field tokens commonly present but not defining
    pub common_fields: &'static [&'static str],
    /// Submit-control wording
    pub submit_words: &'static [&'static str],
    /// Per-archetype confidence ceiling
    pub base_confidence: f32,
}

pub const ARCHETYPES: &[Archetype] = &[
    Archetype {
        name: "login form",
        purpose: "Sign an existing user into an account",
        keywords: &["login", "log-in", "log_in", "signin", "sign-in", "auth", "session"],
        required_fields: &["password"],
        common_fields: &["email", "username", "user", "remember"],
        submit_words: &["log in", "login", "sign in", "continue", "submit"],
        base_confidence: 0.85,
    },
    Archetype {
        name: "registration form",
        purpose: "Create a new user account",
        keywords: &["register", "signup", "sign-up", "sign_up", "join", "create-account"],
        required_fields: &["password", "email"],
        common_fields: &["confirm", "username", "name", "first", "last", "terms"],
        submit_words: &["sign up", "register", "create account", "join", "get started"],
        base_confidence: 0.85,
    },
    Archetype {
        name: "password reset form",
        purpose: "Recover or reset account credentials",
        keywords: &["reset", "forgot", "recover", "password-reset"],
        required_fields: &["email"],
        common_fields: &["password", "confirm", "code", "otp"],
        submit_words: &["reset password", "send", "submit", "continue"],
        base_confidence: 0.8,
    },
    Archetype {
        name: "checkout form",
        purpose: "Complete a purchase with payment and shipping details",
        keywords: &["checkout", "payment", "billing", "order", "cart"],
        required_fields: &["card", "payment"],
        common_fields: &["address", "city", "zip", "postal", "cvv", "expiry", "name", "country"],
        submit_words: &["pay", "place order", "checkout", "continue", "confirm"],
        base_confidence: 0.8,
    },
    Archetype {
        name: "contact form",
        purpose: "Send a message to the site owner",
        keywords: &["contact", "inquiry", "enquiry", "feedback", "support", "get-in-touch"],
        required_fields: &["message"],
        common_fields: &["name", "email", "subject", "phone", "company"],
        submit_words: &["send", "submit", "send message"],
        base_confidence: 0.75,
    },
    Archetype {
        name: "survey form",
        purpose: "Collect structured answers to a questionnaire",
        keywords: &["survey", "questionnaire", "poll", "quiz", "feedback"],
        required_fields: &[],
        common_fields: &["rating", "question", "answer", "scale", "choice"],
        submit_words: &["submit", "next", "finish", "done"],
        base_confidence: 0.7,
    },
    Archetype {
        name: "upload form",
        purpose: "Submit one or more files",
        keywords: &["upload", "attachment", "import", "file"],
        required_fields: &["file"],
        common_fields: &["description", "title", "name"],
        submit_words: &["upload", "submit", "import"],
        base_confidence: 0.75,
    },
    Archetype {
        name: "subscription form",
        purpose: "Subscribe to a mailing list or service",
        keywords: &["subscribe", "newsletter", "mailing"],
        required_fields: &["email"],
        common_fields: &["name", "frequency"],
        submit_words: &["subscribe", "sign up", "join"],
        base_confidence: 0.7,
    },
    Archetype {
        name: "search form",
        purpose: "Query site or web content",
        keywords: &["search", "query", "find"],
        required_fields: &[],
        common_fields: &["search", "query", "q", "keyword"],
        submit_words: &["search", "go", "find"],
        base_confidence: 0.7,
    },
    Archetype {
        name: "comment form",
        purpose: "Post a comment or reply",
        keywords: &["comment", "reply", "respond", "discussion"],
        required_fields: &["comment"],
        common_fields: &["name", "email", "website", "message"],
        submit_words: &["post", "reply", "submit", "send"],
        base_confidence: 0.7,
    },
];
