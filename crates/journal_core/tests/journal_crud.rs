use journal_core::model::catalog::{
    CreateActivityInput, CreateCategoryInput, CreateTrackInput, TrackDisplayType,
};
use journal_core::model::journal::{
    AddJournalTrackInput, CreateJournalEventInput, JournalStatus, JournalTrackInput,
};
use journal_core::{
    open_db_in_memory, CatalogRepository, CreateJournalInput, GetJournalsInput, JournalErrorKind,
    JournalRepository, JournalService, JournalServiceError, JournalStore, RepoError,
    SqliteCatalogRepository, SqliteJournalRepository,
};
use rusqlite::Connection;

struct Fixture {
    conn: Connection,
    user_id: i64,
    other_user_id: i64,
    group_id: i64,
    category_id: i64,
    run_id: i64,
    read_id: i64,
    water_id: i64,
}

fn fixture() -> Fixture {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
    let user_id = catalog.create_user("ada").unwrap();
    let other_user_id = catalog.create_user("grace").unwrap();
    let group_id = catalog.create_group("household").unwrap();
    let category_id = catalog
        .create_category(&CreateCategoryInput {
            category_name: "work".to_string(),
            group_id,
        })
        .unwrap()
        .id;
    let activity = |name: &str| {
        catalog
            .create_activity(&CreateActivityInput {
                activity_name: name.to_string(),
                group_id,
                icon_id: None,
            })
            .unwrap()
            .id
    };
    let run_id = activity("run");
    let read_id = activity("read");
    let water_id = catalog
        .create_track(&CreateTrackInput {
            track_name: "water".to_string(),
            track_display_type: TrackDisplayType::Value,
            group_id,
        })
        .unwrap()
        .id;
    drop(catalog);

    Fixture {
        conn,
        user_id,
        other_user_id,
        group_id,
        category_id,
        run_id,
        read_id,
        water_id,
    }
}

fn journal(group_id: i64, title: &str, date: i64) -> CreateJournalInput {
    CreateJournalInput {
        journal_title: title.to_string(),
        journal_date: date,
        journal_body: None,
        mood_id: None,
        group_id,
        category_id: None,
        tracks: Vec::new(),
        activities: Vec::new(),
        events: Vec::new(),
    }
}

#[test]
fn create_journal_persists_children() {
    let mut fx = fixture();
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut fx.conn).unwrap());

    let input = CreateJournalInput {
        mood_id: Some(3),
        category_id: Some(fx.category_id),
        tracks: vec![JournalTrackInput {
            track_id: fx.water_id,
            track_goal: Some(8),
            track_value: 5,
        }],
        activities: vec![fx.read_id, fx.run_id, fx.read_id],
        events: vec![
            CreateJournalEventInput {
                event_title: "breakfast".to_string(),
                event_body: "eggs".to_string(),
                event_mood_id: Some(1),
            },
            CreateJournalEventInput {
                event_title: "meeting".to_string(),
                event_body: String::new(),
                event_mood_id: None,
            },
        ],
        ..journal(fx.group_id, "Monday", 1_000)
    };
    let detail = service.create_journal(fx.user_id, &input).unwrap();

    assert_eq!(detail.journal.user_id, fx.user_id);
    assert_eq!(detail.journal.journal_status, JournalStatus::GroupOnly);
    assert_eq!(detail.journal.category_id, Some(fx.category_id));
    assert_eq!(detail.activity_ids, vec![fx.run_id, fx.read_id]);
    assert_eq!(detail.tracks.len(), 1);
    assert_eq!(detail.tracks[0].track_value, 5);
    assert_eq!(detail.tracks[0].track_goal, Some(8));

    let events: Vec<(&str, i64)> = detail
        .events
        .iter()
        .map(|event| (event.event_title.as_str(), event.event_index))
        .collect();
    assert_eq!(events, vec![("breakfast", 0), ("meeting", 1)]);
    assert_eq!(detail.events[0].mood_id, Some(1));
}

#[test]
fn create_journal_with_unknown_mood_writes_nothing() {
    let mut fx = fixture();
    {
        let mut service =
            JournalService::new(SqliteJournalRepository::try_new(&mut fx.conn).unwrap());
        let input = CreateJournalInput {
            events: vec![CreateJournalEventInput {
                event_title: "lost".to_string(),
                event_body: String::new(),
                event_mood_id: Some(99),
            }],
            ..journal(fx.group_id, "Monday", 1_000)
        };
        let err = service.create_journal(fx.user_id, &input).unwrap_err();
        assert_eq!(err.kind(), JournalErrorKind::ReferentialViolation);
    }

    let journals: i64 = fx
        .conn
        .query_row("SELECT COUNT(*) FROM journals;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(journals, 0);
}

#[test]
fn create_journal_rejects_blank_title() {
    let mut fx = fixture();
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut fx.conn).unwrap());
    let err = service
        .create_journal(fx.user_id, &journal(fx.group_id, "  ", 1_000))
        .unwrap_err();
    assert_eq!(err.kind(), JournalErrorKind::InvalidInput);
}

#[test]
fn list_journals_filters_and_orders_by_date() {
    let mut fx = fixture();
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut fx.conn).unwrap());

    let early = service
        .create_journal(fx.user_id, &journal(fx.group_id, "early", 1_000))
        .unwrap();
    let late = service
        .create_journal(
            fx.user_id,
            &CreateJournalInput {
                mood_id: Some(2),
                category_id: Some(fx.category_id),
                activities: vec![fx.run_id],
                ..journal(fx.group_id, "late", 3_000)
            },
        )
        .unwrap();
    service
        .create_journal(fx.other_user_id, &journal(fx.group_id, "not mine", 2_000))
        .unwrap();

    let all = service.list_journals(fx.user_id, None).unwrap();
    let ids: Vec<i64> = all.iter().map(|journal| journal.id).collect();
    assert_eq!(ids, vec![late.journal.id, early.journal.id]);

    let in_range = service
        .list_journals(
            fx.user_id,
            Some(&GetJournalsInput {
                start_date: Some(500),
                end_date: Some(1_500),
                ..GetJournalsInput::default()
            }),
        )
        .unwrap();
    assert_eq!(in_range.len(), 1);
    assert_eq!(in_range[0].id, early.journal.id);

    for query in [
        GetJournalsInput {
            category_id: Some(fx.category_id),
            ..GetJournalsInput::default()
        },
        GetJournalsInput {
            mood_id: Some(2),
            ..GetJournalsInput::default()
        },
        GetJournalsInput {
            activity_ids: vec![fx.read_id, fx.run_id],
            ..GetJournalsInput::default()
        },
    ] {
        let found = service.list_journals(fx.user_id, Some(&query)).unwrap();
        assert_eq!(found.len(), 1, "query {query:?}");
        assert_eq!(found[0].id, late.journal.id);
    }
}

#[test]
fn remove_journal_cascades_children_and_checks_owner() {
    let mut fx = fixture();
    let journal_id = {
        let mut service =
            JournalService::new(SqliteJournalRepository::try_new(&mut fx.conn).unwrap());
        let created = service
            .create_journal(
                fx.user_id,
                &CreateJournalInput {
                    activities: vec![fx.run_id],
                    tracks: vec![JournalTrackInput {
                        track_id: fx.water_id,
                        track_goal: None,
                        track_value: 1,
                    }],
                    events: vec![CreateJournalEventInput {
                        event_title: "a".to_string(),
                        event_body: String::new(),
                        event_mood_id: None,
                    }],
                    ..journal(fx.group_id, "doomed", 1_000)
                },
            )
            .unwrap();
        let journal_id = created.journal.id;

        let err = service
            .remove_journal(fx.other_user_id, journal_id)
            .unwrap_err();
        assert!(matches!(err, JournalServiceError::JournalNotFound(id) if id == journal_id));

        let removed = service.remove_journal(fx.user_id, journal_id).unwrap();
        assert_eq!(removed.journal_title, "doomed");
        assert!(service.get_journal(journal_id).unwrap().is_none());
        journal_id
    };

    for table in ["events", "journal_activities", "journal_tracks"] {
        let count: i64 = fx
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE journal_id = ?1;"),
                [journal_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 0, "{table} rows left behind");
    }
}

#[test]
fn journal_tracks_can_be_added_and_removed() {
    let mut fx = fixture();
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut fx.conn).unwrap());
    let created = service
        .create_journal(fx.user_id, &journal(fx.group_id, "tracked", 1_000))
        .unwrap();

    let link = service
        .add_journal_track(&AddJournalTrackInput {
            journal_id: created.journal.id,
            track_id: fx.water_id,
            track_goal: Some(8),
            track_value: 3,
        })
        .unwrap();
    let detail = service.get_journal(created.journal.id).unwrap().unwrap();
    assert_eq!(detail.tracks, vec![link]);

    let removed = service.remove_journal_track(link.id).unwrap();
    assert_eq!(removed, link);
    assert!(matches!(
        service.remove_journal_track(link.id).unwrap_err().kind(),
        JournalErrorKind::NotFound
    ));

    let err = service
        .add_journal_track(&AddJournalTrackInput {
            journal_id: created.journal.id,
            track_id: 404,
            track_goal: None,
            track_value: 1,
        })
        .unwrap_err();
    assert_eq!(err.kind(), JournalErrorKind::ReferentialViolation);
}

#[test]
fn long_activity_id_lists_stay_within_statement_limits() {
    let mut fx = fixture();
    let mut repo = SqliteJournalRepository::try_new(&mut fx.conn).unwrap();
    let input = journal(fx.group_id, "busy", 1_000);
    let journal_id = repo
        .write_transaction(|store| {
            let journal_id = store.insert_journal(fx.user_id, &input)?;
            store.insert_activity_links(journal_id, &[fx.run_id])?;
            Ok::<_, RepoError>(journal_id)
        })
        .unwrap();

    let mut many: Vec<i64> = (1_000_000..1_040_000).collect();
    many.push(fx.run_id);

    let found = repo
        .list_journals(
            fx.user_id,
            &GetJournalsInput {
                activity_ids: many.clone(),
                ..GetJournalsInput::default()
            },
        )
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, journal_id);

    let removed = repo
        .write_transaction(|store| store.delete_activity_links(journal_id, &many))
        .unwrap();
    assert_eq!(removed, 1);
    let detail = repo.get_journal(journal_id).unwrap().unwrap();
    assert!(detail.activity_ids.is_empty());
}
