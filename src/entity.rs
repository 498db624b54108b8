use crate::define_regex;

/// charset (RFC2045-2046)
const URN: &str = r"urn:[a-zA-Z0-9\-]+(:[a-zA-Z0-9\-]+)*";
const URL: &str = r"https?://[a-zA-Z0-9\-._~:/?#\[@\]!$&'()*+,;=]+";

define_regex!(PATTERN_PROFILE, "^({0}|{1})((,({0}|{1}))*)$", URN, URL);
