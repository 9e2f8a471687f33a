/// Convert a snake_case, kebab-case or dotted name to space-separated title case.
///
/// Matches the field titles conventionally emitted by JSON-Schema model
/// generators, and feeds the sample generator's name heuristics.
///
/// # Examples
/// ```
/// use temply_core::utils::to_title_case;
/// assert_eq!(to_title_case("user_name"), "User Name");
/// assert_eq!(to_title_case("order-id"), "Order Id");
/// assert_eq!(to_title_case("email"), "Email");
/// ```
pub fn to_title_case(s: &str) -> String {
    fn is_separator(c: char) -> bool {
        matches!(c, '_' | '-' | '.' | ' ')
    }

    s.split(is_separator)
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
