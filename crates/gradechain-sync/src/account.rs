//! Account naming for restored students.

/// Build a username from a student's name: the given name followed by
/// the initial of each surname word, lowercased and stripped to ASCII
/// alphanumerics.
///
/// Collision suffixing is owned by the staging store, which sees the
/// existing rows.
#[must_use]
pub fn generate_username(first_name: &str, last_name: &str) -> String {
    let mut username = String::with_capacity(first_name.len() + last_name.len());
    username.extend(
        first_name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase()),
    );
    for word in last_name.split_whitespace() {
        if let Some(initial) = word.chars().find(char::is_ascii_alphanumeric) {
            username.push(initial.to_ascii_lowercase());
        }
    }
    username
}
