use super::*;
use shared::domain::CartLine;

fn lesson(id: i64, subject: &str, location: &str, price: f64, spaces: u32) -> Lesson {
    Lesson {
        id: LessonId::from(id),
        subject: subject.to_string(),
        location: location.to_string(),
        price,
        spaces,
    }
}

fn sample_store() -> CatalogStore {
    CatalogStore::new(vec![
        lesson(1, "math", "London", 100.0, 5),
        lesson(2, "English", "Oxford", 80.0, 0),
        lesson(3, "art", "London", 120.0, 2),
        lesson(4, "Music", "", 80.0, 3),
        lesson(5, "Biology", "Bristol", 15000.0, 1),
    ])
}

fn ids(lessons: &[Lesson]) -> Vec<String> {
    lessons.iter().map(|lesson| lesson.id.0.clone()).collect()
}

fn cart_of(lessons: &[&Lesson]) -> Cart {
    let mut cart = Cart::default();
    for lesson in lessons {
        cart.push(CartLine::snapshot_of(lesson));
    }
    cart
}

#[test]
fn default_filters_apply_price_window_and_subject_sort() {
    let displayed = displayed_lessons(&sample_store(), &FilterState::default());

    // 15000 is outside the default 0..=9999 window.
    assert_eq!(ids(&displayed), vec!["3", "2", "1", "4"]);
    for lesson in &displayed {
        assert!(lesson.price >= 0.0 && lesson.price <= 9999.0);
    }
}

#[test]
fn price_bounds_are_inclusive() {
    let filters = FilterState {
        min_price: 80.0,
        max_price: 100.0,
        ..FilterState::default()
    };
    let displayed = displayed_lessons(&sample_store(), &filters);
    assert_eq!(ids(&displayed), vec!["2", "1", "4"]);
}

#[test]
fn location_filter_uses_exact_match() {
    let filters = FilterState {
        location_filter: "London".into(),
        ..FilterState::default()
    };
    let displayed = displayed_lessons(&sample_store(), &filters);
    assert_eq!(ids(&displayed), vec!["3", "1"]);

    let filters = FilterState {
        location_filter: "london".into(),
        ..FilterState::default()
    };
    assert!(displayed_lessons(&sample_store(), &filters).is_empty());
}

#[test]
fn stock_filters_split_available_and_sold_out() {
    let store = sample_store();
    let available = displayed_lessons(
        &store,
        &FilterState {
            filter_key: StockFilter::Available,
            ..FilterState::default()
        },
    );
    assert!(!available.is_empty());
    assert!(available.iter().all(|lesson| lesson.spaces > 0));

    let sold_out = displayed_lessons(
        &store,
        &FilterState {
            filter_key: StockFilter::SoldOut,
            ..FilterState::default()
        },
    );
    assert_eq!(ids(&sold_out), vec!["2"]);
}

#[test]
fn numeric_sorts_respect_direction() {
    let store = sample_store();
    let by_price = displayed_lessons(
        &store,
        &FilterState {
            sort_key: "price-asc".parse().expect("sort key"),
            ..FilterState::default()
        },
    );
    assert!(by_price.windows(2).all(|pair| pair[0].price <= pair[1].price));
    // Equal prices keep catalog order.
    assert_eq!(ids(&by_price), vec!["2", "4", "1", "3"]);

    let by_spaces = displayed_lessons(
        &store,
        &FilterState {
            sort_key: "spaces-desc".parse().expect("sort key"),
            ..FilterState::default()
        },
    );
    assert!(by_spaces
        .windows(2)
        .all(|pair| pair[0].spaces >= pair[1].spaces));
}

#[test]
fn any_direction_other_than_asc_sorts_descending() {
    let filters = FilterState {
        sort_key: "location-sideways".parse().expect("sort key"),
        ..FilterState::default()
    };
    let displayed = displayed_lessons(&sample_store(), &filters);
    assert_eq!(ids(&displayed), vec!["2", "1", "3", "4"]);
}

#[test]
fn unknown_sort_field_keeps_catalog_order() {
    let filters = FilterState {
        sort_key: "colour-asc".parse().expect("sort key"),
        ..FilterState::default()
    };
    let displayed = displayed_lessons(&sample_store(), &filters);
    assert_eq!(ids(&displayed), vec!["1", "2", "3", "4"]);
}

#[test]
fn displayed_lessons_do_not_touch_the_store() {
    let store = sample_store();
    let before = store.clone();
    let _ = displayed_lessons(
        &store,
        &FilterState {
            sort_key: "price-desc".parse().expect("sort key"),
            ..FilterState::default()
        },
    );
    assert_eq!(store, before);
}

#[test]
fn locale_compare_ignores_case_before_breaking_ties() {
    assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
    assert_eq!(locale_compare("Zebra", "apple"), Ordering::Greater);
    assert_eq!(locale_compare("art", "Art"), Ordering::Less);
    assert_eq!(locale_compare("Art", "Art"), Ordering::Equal);
}

#[test]
fn locale_compare_orders_accented_letters_by_code_point() {
    assert_eq!(locale_compare("Zumba", "Éclair"), Ordering::Less);
    assert_eq!(locale_compare("éclair", "Éclair"), Ordering::Less);
}

#[test]
fn location_options_are_distinct_non_empty_in_first_seen_order() {
    assert_eq!(
        location_options(&sample_store()),
        vec!["London", "Oxford", "Bristol"]
    );
}

#[test]
fn cart_summary_groups_lines_in_first_seen_order() {
    let store = sample_store();
    let math = store.find(&LessonId::from(1)).expect("math").clone();
    let art = store.find(&LessonId::from(3)).expect("art").clone();
    let cart = cart_of(&[&art, &math, &art, &art]);

    let summary = cart_summary(&cart, &store);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].lesson_id, LessonId::from(3));
    assert_eq!(summary[0].qty, 3);
    assert_eq!(summary[1].lesson_id, LessonId::from(1));
    assert_eq!(summary[1].qty, 1);

    for entry in &summary {
        assert_eq!(entry.qty as usize, cart.quantity(&entry.lesson_id));
    }
    assert_eq!(cart_total(&cart), 460.0);
}

#[test]
fn can_increase_reflects_the_current_store() {
    let mut store = sample_store();
    let art = store.find(&LessonId::from(3)).expect("art").clone();
    let cart = cart_of(&[&art]);
    assert!(cart_summary(&cart, &store)[0].can_increase);

    store.patch_spaces(&Lesson { spaces: 0, ..art.clone() });
    assert!(!cart_summary(&cart, &store)[0].can_increase);

    store.replace(Vec::new());
    let summary = cart_summary(&cart, &store);
    assert_eq!(summary[0].qty, 1);
    assert!(!summary[0].can_increase);
}

#[test]
fn empty_cart_has_zero_total() {
    let cart = Cart::default();
    assert!(cart_summary(&cart, &sample_store()).is_empty());
    assert_eq!(cart_total(&cart), 0.0);
}

fn form(name: &str, phone: &str, address: &str) -> CustomerForm {
    CustomerForm {
        name: name.into(),
        phone: phone.into(),
        email: String::new(),
        address: address.into(),
    }
}

#[test]
fn valid_customer_checks_name_phone_and_address() {
    assert!(valid_customer(&form("John Smith", "+1 555-1234", "1 High St")));
    assert!(valid_customer(&form("  John Smith ", " 555 ", " 1 High St ")));

    assert!(!valid_customer(&form("John123", "+1 555-1234", "1 High St")));
    assert!(!valid_customer(&form("John Smith", "abc", "1 High St")));
    assert!(!valid_customer(&form("John Smith", "+1 555-1234", "   ")));
    assert!(!valid_customer(&form("   ", "+1 555-1234", "1 High St")));
    assert!(!valid_customer(&form("John Smith", "", "1 High St")));
}

#[test]
fn email_is_not_part_of_customer_validation() {
    let mut customer = form("Jane Doe", "0123", "2 Low Rd");
    customer.email = "not an email".into();
    assert!(valid_customer(&customer));
}
