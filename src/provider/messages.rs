// Provider message -> end user message, matched on lower-cased substrings.
// First match wins.
const FRIENDLY_MESSAGES: &[(&[&str], &str)] = &[
    (
        &["unauthorized", "invalid login credentials"],
        "Invalid email or password. Please try again.",
    ),
    (&["user not found"], "No account found with this email."),
    (
        &["already registered"],
        "This email is already registered. Try logging in instead.",
    ),
    (&["invalid email"], "Please enter a valid email address."),
    (
        &["password too short", "password should be at least"],
        "Password must be at least 6 characters long.",
    ),
    (
        &["too many requests", "rate limit"],
        "Too many login attempts. Please wait a moment and try again.",
    ),
];

const FALLBACK: &str = "Something went wrong. Please try again.";

pub(super) fn friendly(raw: &str) -> String {
    let lowered = raw.to_lowercase();

    FRIENDLY_MESSAGES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(_, message)| message.to_string())
        .unwrap_or_else(|| {
            if raw.trim().is_empty() {
                FALLBACK.to_string()
            } else {
                raw.to_string()
            }
        })
}
