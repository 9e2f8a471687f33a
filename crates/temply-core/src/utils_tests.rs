use crate::utils::to_title_case;

#[test]
fn title_case_from_snake() {
    assert_eq!(to_title_case("user_name"), "User Name");
    assert_eq!(to_title_case("name"), "Name");
    assert_eq!(to_title_case("_name"), "Name");
    assert_eq!(to_title_case("name_"), "Name");
}

#[test]
fn title_case_keeps_inner_case() {
    assert_eq!(to_title_case("orderID"), "OrderID");
    assert_eq!(to_title_case("HTML_EMAIL"), "HTML EMAIL");
}

#[test]
fn title_case_from_kebab_and_dots() {
    assert_eq!(to_title_case("order-items"), "Order Items");
    assert_eq!(to_title_case("order.items"), "Order Items");
}

#[test]
fn title_case_empty() {
    assert_eq!(to_title_case(""), "");
    assert_eq!(to_title_case("__"), "");
}
