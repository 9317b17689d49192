use journal_core::model::journal::CreateJournalEventInput;
use journal_core::{
    open_db_in_memory, CatalogRepository, CreateJournalInput, JournalErrorKind, JournalService,
    MoodCount, SqliteCatalogRepository, SqliteJournalRepository, YearlyCounter,
};

const JAN_15_2024: i64 = 1_705_276_800_000;
const FEB_10_2024: i64 = 1_707_523_200_000;
const MAR_20_2024: i64 = 1_710_892_800_000;
const LAST_SECOND_OF_2024: i64 = 1_735_689_599_000;
const NEW_YEAR_2025: i64 = 1_735_689_600_000;
const JUNE_2023: i64 = 1_685_577_600_000;

const GREAT: i64 = 1;
const OKAY: i64 = 3;
const BAD: i64 = 4;

fn entry(group_id: i64, date: i64, mood_id: Option<i64>, events: usize) -> CreateJournalInput {
    CreateJournalInput {
        journal_title: "day".to_string(),
        journal_date: date,
        journal_body: None,
        mood_id,
        group_id,
        category_id: None,
        tracks: Vec::new(),
        activities: Vec::new(),
        events: (0..events)
            .map(|n| CreateJournalEventInput {
                event_title: format!("event {n}"),
                event_body: String::new(),
                event_mood_id: None,
            })
            .collect(),
    }
}

fn counts(moods: &[MoodCount], name: &str) -> (i64, i64) {
    let mood = moods
        .iter()
        .find(|mood| mood.mood_name == name)
        .unwrap_or_else(|| panic!("mood {name} missing"));
    (mood.journal_count, mood.event_count)
}

#[test]
fn yearly_summary_counts_journals_and_events_per_month_and_mood() {
    let mut conn = open_db_in_memory().unwrap();
    let (user_id, other_user_id, group_id) = {
        let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
        (
            catalog.create_user("ada").unwrap(),
            catalog.create_user("grace").unwrap(),
            catalog.create_group("household").unwrap(),
        )
    };
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    for input in [
        entry(group_id, JAN_15_2024, Some(GREAT), 2),
        entry(group_id, JAN_15_2024 + 3_600_000, Some(GREAT), 0),
        entry(group_id, FEB_10_2024, None, 3),
        entry(group_id, MAR_20_2024, Some(BAD), 1),
        entry(group_id, LAST_SECOND_OF_2024, Some(OKAY), 0),
        entry(group_id, NEW_YEAR_2025, Some(GREAT), 4),
        entry(group_id, JUNE_2023, Some(BAD), 1),
    ] {
        service.create_journal(user_id, &input).unwrap();
    }
    service
        .create_journal(other_user_id, &entry(group_id, JAN_15_2024, Some(GREAT), 5))
        .unwrap();

    let summary = service.yearly_summary(user_id, 2024).unwrap();

    let months: Vec<u32> = summary
        .monthly_mood_data
        .iter()
        .map(|data| data.month)
        .collect();
    assert_eq!(months, (1..=12).collect::<Vec<u32>>());
    for data in &summary.monthly_mood_data {
        let names: Vec<&str> = data.moods.iter().map(|mood| mood.mood_name.as_str()).collect();
        assert_eq!(names, vec!["awful", "bad", "good", "great", "okay"]);
    }

    let month = |number: usize| &summary.monthly_mood_data[number - 1].moods;
    assert_eq!(counts(month(1), "great"), (2, 2));
    assert_eq!(counts(month(1), "bad"), (0, 0));
    assert!(month(2).iter().all(|mood| mood.journal_count == 0 && mood.event_count == 0));
    assert_eq!(counts(month(3), "bad"), (1, 1));
    assert_eq!(counts(month(6), "bad"), (0, 0));
    assert_eq!(counts(month(12), "okay"), (1, 0));

    assert_eq!(
        summary.counter,
        YearlyCounter {
            total_journal_count: 5,
            total_event_count: 6,
        }
    );
}

#[test]
fn yearly_summary_of_an_empty_year_has_zero_rows_for_every_mood() {
    let mut conn = open_db_in_memory().unwrap();
    let user_id = SqliteCatalogRepository::try_new(&conn)
        .unwrap()
        .create_user("ada")
        .unwrap();
    let service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let summary = service.yearly_summary(user_id, 1999).unwrap();
    assert_eq!(summary.monthly_mood_data.len(), 12);
    assert!(summary
        .monthly_mood_data
        .iter()
        .all(|data| data.moods.len() == 5
            && data.moods.iter().all(|mood| mood.journal_count == 0)));
    assert_eq!(summary.counter, YearlyCounter::default());

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["counter"]["totalJournalCount"], 0);
    assert_eq!(json["monthlyMoodData"][0]["moods"][0]["moodName"], "awful");
}

#[test]
fn yearly_summary_rejects_years_outside_four_digits() {
    let mut conn = open_db_in_memory().unwrap();
    let service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());
    for year in [0, -5, 10_000] {
        let err = service.yearly_summary(1, year).unwrap_err();
        assert_eq!(err.kind(), JournalErrorKind::InvalidInput);
    }
}
