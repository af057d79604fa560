use chrono::NaiveTime;

use super::*;

#[test]
fn test_classify_boundaries() {
    assert_eq!(classify_hour(0), Session::Morning);
    assert_eq!(classify_hour(11), Session::Morning);
    assert_eq!(classify_hour(12), Session::Afternoon);
    assert_eq!(classify_hour(17), Session::Afternoon);
    assert_eq!(classify_hour(18), Session::Night);
    assert_eq!(classify_hour(23), Session::Night);
}

#[test]
fn test_classify_every_hour_lands_in_one_window() {
    let mut counts = [0usize; 3];
    for hour in 0..24 {
        match classify_hour(hour) {
            Session::Morning => counts[0] += 1,
            Session::Afternoon => counts[1] += 1,
            Session::Night => counts[2] += 1,
        }
    }
    assert_eq!(counts, [12, 6, 6]);
}

#[test]
fn test_session_at_uses_hour_only() {
    let just_before_noon = NaiveTime::from_hms_opt(11, 59, 59).unwrap();
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();

    assert_eq!(Session::at(&just_before_noon), Session::Morning);
    assert_eq!(Session::at(&noon), Session::Afternoon);
}

#[test]
fn test_session_order_follows_the_day() {
    assert!(Session::Morning < Session::Afternoon);
    assert!(Session::Afternoon < Session::Night);
    assert!(Session::Night.is_later_than(Session::Morning));
    assert!(!Session::Morning.is_later_than(Session::Morning));
}

#[test]
fn test_parse_and_display() {
    for session in Session::ALL {
        let parsed: Session = session.as_str().parse().unwrap();
        assert_eq!(parsed, session);
        assert_eq!(session.to_string(), session.as_str());
    }
    assert!("evening".parse::<Session>().is_err());
    assert!("Morning".parse::<Session>().is_err());
}

#[test]
fn test_serde_uses_lowercase_labels() {
    let json = serde_json::to_string(&Session::Afternoon).unwrap();
    assert_eq!(json, "\"afternoon\"");

    let session: Session = serde_json::from_str("\"night\"").unwrap();
    assert_eq!(session, Session::Night);
}
