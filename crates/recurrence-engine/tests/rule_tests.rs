//! Rule construction, validation, and flat-record conversion.

use chrono::{NaiveDate, NaiveTime, Weekday};
use recurrence_engine::{
    Frequency, MonthDay, Pattern, RecurrenceError, RecurrenceRecord, RecurrenceRule, WeekdaySet,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn record(pattern: &str, interval: i64) -> RecurrenceRecord {
    RecurrenceRecord::new(ymd(2016, 1, 1).and_hms_opt(12, 30, 0).unwrap(), pattern, interval)
}

// ---------------------------------------------------------------------------
// Builder validation
// ---------------------------------------------------------------------------

#[test]
fn zero_interval_is_rejected() {
    let err = RecurrenceRule::builder(ymd(2016, 1, 1), Pattern::Daily { weekdays_only: false })
        .interval(0)
        .build()
        .unwrap_err();
    assert_eq!(err, RecurrenceError::InvalidInterval(0));
}

#[test]
fn negative_interval_is_rejected() {
    let err = RecurrenceRule::builder(ymd(2016, 1, 1), Pattern::Weekly { days: WeekdaySet::ALL })
        .interval(-3)
        .build()
        .unwrap_err();
    assert_eq!(err, RecurrenceError::InvalidInterval(-3));
}

#[test]
fn oversized_interval_is_rejected() {
    let err = RecurrenceRule::builder(ymd(2016, 1, 1), Pattern::Daily { weekdays_only: false })
        .interval(i64::from(u32::MAX) + 1)
        .build()
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::InvalidInterval(_)));
}

#[test]
fn interval_above_i32_max_is_rejected() {
    let yearly = Pattern::Yearly {
        month: 6,
        on: MonthDay::Day(15),
    };
    let err = RecurrenceRule::builder(ymd(2016, 1, 1), yearly)
        .interval(3_000_000_000)
        .build()
        .unwrap_err();
    assert_eq!(err, RecurrenceError::InvalidInterval(3_000_000_000));

    let largest = RecurrenceRule::builder(ymd(2016, 1, 1), yearly)
        .interval(i64::from(i32::MAX))
        .build()
        .unwrap();
    assert_eq!(largest.interval(), i32::MAX as u32);
}

#[test]
fn out_of_range_fields_are_rejected() {
    let cases = [
        (Pattern::Monthly { on: MonthDay::Day(0) }, "day_of_month"),
        (Pattern::Monthly { on: MonthDay::Day(32) }, "day_of_month"),
        (
            Pattern::Monthly {
                on: MonthDay::NthWeekday { week: 6, weekday: Weekday::Mon },
            },
            "week_of_month",
        ),
        (
            Pattern::Yearly { month: 13, on: MonthDay::Day(1) },
            "month",
        ),
        (
            Pattern::Yearly { month: 0, on: MonthDay::Day(1) },
            "month",
        ),
    ];
    for (pattern, expected_field) in cases {
        let err = RecurrenceRule::builder(ymd(2016, 1, 1), pattern).build().unwrap_err();
        match err {
            RecurrenceError::OutOfRange { field, .. } => assert_eq!(field, expected_field),
            other => panic!("expected OutOfRange for {:?}, got {:?}", pattern, other),
        }
    }
}

#[test]
fn builder_keeps_every_field() {
    let time = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
    let r = RecurrenceRule::builder(ymd(2016, 1, 1), Pattern::Daily { weekdays_only: true })
        .interval(4)
        .end_by(ymd(2016, 6, 1))
        .time_of_day(time)
        .build()
        .unwrap();

    assert_eq!(r.start(), ymd(2016, 1, 1));
    assert_eq!(r.interval(), 4);
    assert_eq!(r.end_by(), Some(ymd(2016, 6, 1)));
    assert_eq!(r.time_of_day(), Some(time));
    assert_eq!(r.pattern().frequency(), Frequency::Daily);
}

#[test]
fn error_messages_name_the_problem() {
    assert_eq!(
        RecurrenceError::InvalidInterval(0).to_string(),
        "Invalid interval: 0 (must be between 1 and 2147483647)"
    );
    assert_eq!(
        RecurrenceError::OutOfRange { field: "month", value: 13 }.to_string(),
        "month out of range: 13"
    );
}

// ---------------------------------------------------------------------------
// Frequency codes
// ---------------------------------------------------------------------------

#[test]
fn frequency_parses_codes_and_names() {
    assert_eq!("D".parse::<Frequency>().unwrap(), Frequency::Daily);
    assert_eq!("w".parse::<Frequency>().unwrap(), Frequency::Weekly);
    assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
    assert_eq!(" YEARLY ".parse::<Frequency>().unwrap(), Frequency::Yearly);
    assert_eq!(Frequency::Monthly.code().parse::<Frequency>(), Ok(Frequency::Monthly));
    assert_eq!(
        "B".parse::<Frequency>().unwrap_err(),
        RecurrenceError::UnknownPattern("B".to_string())
    );
}

// ---------------------------------------------------------------------------
// Record conversion
// ---------------------------------------------------------------------------

#[test]
fn unknown_pattern_code_matches_nothing() {
    let rec = record("B", 1);
    assert_eq!(rec.occurrences_between(ymd(2016, 1, 1), ymd(2017, 1, 1)), Ok(vec![]));
    assert_eq!(rec.is_occurrence_on(ymd(2016, 1, 1)), Ok(false));
    assert!(matches!(rec.to_rule(), Err(RecurrenceError::UnknownPattern(_))));
}

#[test]
fn monthly_record_without_day_fields_is_incomplete() {
    let err = record("M", 1).to_rule().unwrap_err();
    assert!(matches!(err, RecurrenceError::IncompleteRule(_)));

    let mut half = record("M", 1);
    half.week_of_month = Some(2);
    assert!(matches!(half.to_rule(), Err(RecurrenceError::IncompleteRule(_))));
}

#[test]
fn incomplete_record_is_an_error_not_an_empty_result() {
    let rec = record("Y", 1);
    assert!(rec.occurrences_between(ymd(2016, 1, 1), ymd(2017, 1, 1)).is_err());
}

#[test]
fn yearly_record_without_month_is_incomplete() {
    let mut rec = record("Y", 1);
    rec.day_of_month = Some(14);
    assert_eq!(
        rec.to_rule().unwrap_err(),
        RecurrenceError::IncompleteRule("yearly rule has no month".to_string())
    );
}

#[test]
fn day_of_month_takes_precedence_over_weekday_pair() {
    let mut rec = record("M", 1);
    rec.day_of_month = Some(15);
    rec.week_of_month = Some(3);
    rec.day_of_week = Some(4);
    let rule = rec.to_rule().unwrap();
    assert_eq!(rule.pattern(), &Pattern::Monthly { on: MonthDay::Day(15) });
}

#[test]
fn day_of_week_is_sunday_based() {
    let mut rec = record("M", 2);
    rec.week_of_month = Some(4);
    rec.day_of_week = Some(4);
    let rule = rec.to_rule().unwrap();
    assert_eq!(
        rule.pattern(),
        &Pattern::Monthly {
            on: MonthDay::NthWeekday { week: 4, weekday: Weekday::Thu }
        }
    );

    rec.day_of_week = Some(7);
    assert_eq!(
        rec.to_rule().unwrap_err(),
        RecurrenceError::OutOfRange { field: "day_of_week", value: 7 }
    );
}

#[test]
fn record_defaults_for_daily_and_weekly() {
    let daily = record("D", 1).to_rule().unwrap();
    assert_eq!(daily.pattern(), &Pattern::Daily { weekdays_only: false });

    let weekly = record("W", 1).to_rule().unwrap();
    assert_eq!(weekly.pattern(), &Pattern::Weekly { days: WeekdaySet::ALL });
}

#[test]
fn record_strips_time_but_keeps_it_for_instances() {
    let mut rec = record("D", 1);
    rec.end_by = Some(ymd(2016, 1, 3).and_hms_opt(18, 0, 0).unwrap());
    let rule = rec.to_rule().unwrap();

    assert_eq!(rule.start(), ymd(2016, 1, 1));
    assert_eq!(rule.end_by(), Some(ymd(2016, 1, 3)));
    assert_eq!(rule.time_of_day(), NaiveTime::from_hms_opt(12, 30, 0));
    assert_eq!(
        rec.occurrences_between(ymd(2016, 1, 1), ymd(2016, 1, 31)).unwrap(),
        vec![ymd(2016, 1, 1), ymd(2016, 1, 2)]
    );
}

#[test]
fn weekly_record_reads_stored_day_mask() {
    let json = r#"{
        "start": "2016-01-01",
        "pattern": "W",
        "interval": 2,
        "weekly_days_included": 42
    }"#;
    let rec: RecurrenceRecord = serde_json::from_str(json).unwrap();
    assert_eq!(rec.weekly_days_included, Some(42));

    let rule = rec.to_rule().unwrap();
    let mwf: WeekdaySet = [Weekday::Mon, Weekday::Wed, Weekday::Fri].into_iter().collect();
    assert_eq!(rule.pattern(), &Pattern::Weekly { days: mwf });
    assert_eq!(
        rule.occurrences_between(ymd(2016, 1, 1), ymd(2016, 1, 15)),
        vec![ymd(2016, 1, 1), ymd(2016, 1, 11), ymd(2016, 1, 13), ymd(2016, 1, 15)]
    );
}

#[test]
fn weekday_list_takes_precedence_over_mask() {
    let mut rec = record("W", 1);
    rec.weekdays = Some(vec![Weekday::Tue]);
    rec.weekly_days_included = Some(42);
    assert_eq!(
        rec.to_rule().unwrap().pattern(),
        &Pattern::Weekly { days: WeekdaySet::single(Weekday::Tue) }
    );
}

#[test]
fn zero_mask_matches_nothing_and_wide_mask_is_rejected() {
    let mut rec = record("W", 1);
    rec.weekly_days_included = Some(0);
    assert_eq!(rec.occurrences_between(ymd(2016, 1, 1), ymd(2016, 3, 1)), Ok(vec![]));

    rec.weekly_days_included = Some(128);
    assert_eq!(
        rec.to_rule().unwrap_err(),
        RecurrenceError::OutOfRange { field: "weekly_days_included", value: 128 }
    );
}

#[test]
fn rules_survive_a_trip_through_record_form() {
    let time = NaiveTime::from_hms_opt(8, 45, 0).unwrap();
    let patterns = [
        Pattern::Daily { weekdays_only: true },
        Pattern::Weekly {
            days: [Weekday::Sun, Weekday::Thu].into_iter().collect(),
        },
        Pattern::Monthly { on: MonthDay::Day(31) },
        Pattern::Yearly {
            month: 11,
            on: MonthDay::NthWeekday { week: 4, weekday: Weekday::Thu },
        },
    ];
    for pattern in patterns {
        let rule = RecurrenceRule::builder(ymd(2016, 1, 1), pattern)
            .interval(3)
            .end_by(ymd(2020, 1, 1))
            .time_of_day(time)
            .build()
            .unwrap();
        let rec = RecurrenceRecord::from_rule(&rule);
        assert_eq!(rec.to_rule().unwrap(), rule, "{:?}", pattern);
    }
}

#[test]
fn stored_weekly_record_uses_mask_column() {
    let days: WeekdaySet = [Weekday::Mon, Weekday::Wed, Weekday::Fri].into_iter().collect();
    let rule = RecurrenceRule::builder(ymd(2016, 1, 1), Pattern::Weekly { days })
        .build()
        .unwrap();
    let value = serde_json::to_value(RecurrenceRecord::from_rule(&rule)).unwrap();
    assert_eq!(value["pattern"], "W");
    assert_eq!(value["weekly_days_included"], 42);
    assert!(value.get("weekdays").is_none());
}

#[test]
fn record_rejects_bad_interval() {
    assert_eq!(
        record("D", 0).to_rule().unwrap_err(),
        RecurrenceError::InvalidInterval(0)
    );
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

#[test]
fn record_deserializes_dates_and_datetimes() {
    let json = r#"{
        "start": "2016-01-01T12:30:00",
        "pattern": "W",
        "interval": 2,
        "end_by": "2016-03-01",
        "weekdays": ["Mon", "Wed", "Fri"]
    }"#;
    let rec: RecurrenceRecord = serde_json::from_str(json).unwrap();
    assert_eq!(rec.start, ymd(2016, 1, 1).and_hms_opt(12, 30, 0).unwrap());
    assert_eq!(rec.end_by, Some(ymd(2016, 3, 1).and_time(NaiveTime::MIN)));
    assert_eq!(rec.weekdays, Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]));

    let rule = rec.to_rule().unwrap();
    assert_eq!(
        rule.occurrences_between(ymd(2016, 1, 1), ymd(2016, 1, 15)),
        vec![ymd(2016, 1, 1), ymd(2016, 1, 11), ymd(2016, 1, 13), ymd(2016, 1, 15)]
    );
}

#[test]
fn record_interval_defaults_to_one() {
    let rec: RecurrenceRecord =
        serde_json::from_str(r#"{"start": "2016-01-01", "pattern": "D"}"#).unwrap();
    assert_eq!(rec.interval, 1);
    assert_eq!(rec.start, ymd(2016, 1, 1).and_time(NaiveTime::MIN));
}

#[test]
fn record_serializes_without_unset_fields() {
    let value = serde_json::to_value(record("D", 3)).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 3, "only start, pattern, interval: {:?}", obj);
    assert_eq!(obj["start"], "2016-01-01T12:30:00");
}

#[test]
fn weekday_set_serializes_sunday_first() {
    let set: WeekdaySet = [Weekday::Fri, Weekday::Sun, Weekday::Wed].into_iter().collect();
    assert_eq!(serde_json::to_string(&set).unwrap(), r#"["Sun","Wed","Fri"]"#);
}
