use fitclub_core::db::open_db_in_memory;
use fitclub_core::model::diet::DietDraft;
use fitclub_core::model::meal::{MealDraft, MealUnit, MEAL_VALUE_MAX};
use fitclub_core::model::movement::MovementDraft;
use fitclub_core::model::program::ProgramDraft;
use fitclub_core::repo::{MealRepository, MovementRepository};
use fitclub_core::{CatalogService, ListQuery, ServiceError, SqliteRepository};
use uuid::Uuid;

fn meal_draft(name: &str, calories: i64, protein: i64, carbs: i64, oil: i64) -> MealDraft {
    MealDraft {
        name: name.to_string(),
        amount: 100,
        unit: MealUnit::Gram,
        protein,
        carbs,
        oil,
        calories,
    }
}

#[test]
fn movement_defaults_and_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let created = service
        .create_movement(&MovementDraft::new(
            " Squat ",
            "https://videos.example.com/squat",
        ))
        .unwrap();
    assert_eq!(created.name, "Squat");
    assert_eq!((created.sets, created.reps), (3, 12));

    let loaded = service.get_movement(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn movement_rejects_bad_prescription_and_video() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let draft = MovementDraft {
        name: "Bench".to_string(),
        video: "ftp://videos.example.com/bench".to_string(),
        sets: 0,
        reps: 12,
    };
    let err = service.create_movement(&draft).unwrap_err();
    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.has_field("video"));
    assert!(errors.has_field("sets"));
    assert!(!errors.has_field("reps"));
}

#[test]
fn update_replaces_whole_movement() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());
    let created = service
        .create_movement(&MovementDraft::new("Row", "https://videos.example.com/row"))
        .unwrap();

    let updated = service
        .update_movement(
            created.id,
            &MovementDraft {
                name: "Barbell Row".to_string(),
                video: "https://videos.example.com/barbell-row".to_string(),
                sets: 4,
                reps: 8,
            },
        )
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Barbell Row");
    assert_eq!((updated.sets, updated.reps), (4, 8));
}

#[test]
fn updating_missing_meal_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let err = service
        .update_meal(Uuid::new_v4(), &meal_draft("Oats", 380, 13, 67, 7))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "meal", .. }));
}

#[test]
fn meal_rejects_negative_macros() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let err = service
        .create_meal(&meal_draft("Broken", -5, 1, 1, 1))
        .unwrap_err();
    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.has_field("calories"));
}

#[test]
fn meal_rejects_values_past_column_range() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let err = service
        .create_meal(&meal_draft("Huge", MEAL_VALUE_MAX + 1, 1, 1, i64::MAX / 2 + 1))
        .unwrap_err();
    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.has_field("calories"));
    assert!(errors.has_field("oil"));
    assert!(service.list_meals(&ListQuery::default()).unwrap().is_empty());
}

#[test]
fn diet_totals_near_column_limit_do_not_overflow() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let first = service
        .create_meal(&meal_draft("Bulk A", MEAL_VALUE_MAX, MEAL_VALUE_MAX, 0, 0))
        .unwrap();
    let second = service
        .create_meal(&meal_draft("Bulk B", MEAL_VALUE_MAX, 0, 0, 0))
        .unwrap();

    let summary = service
        .create_diet(&DietDraft {
            meal_ids: vec![first.id, second.id],
        })
        .unwrap();
    assert_eq!(summary.totals.total_calories, 2 * MEAL_VALUE_MAX);
    assert_eq!(summary.totals.total_protein, MEAL_VALUE_MAX);
    assert_eq!(summary.name(), "4294967294 Kcal Diet");
}

#[test]
fn meals_table_refuses_out_of_range_values() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO meals (uuid, name, amount, calories) VALUES (?1, 'Raw', 1, ?2);",
        rusqlite::params![Uuid::new_v4().to_string(), MEAL_VALUE_MAX + 1],
    );
    assert!(result.is_err());
}

#[test]
fn diet_totals_sum_constituent_meals() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let eggs = service.create_meal(&meal_draft("Eggs", 155, 13, 1, 11)).unwrap();
    let rice = service.create_meal(&meal_draft("Rice", 130, 3, 28, 0)).unwrap();
    let chicken = service
        .create_meal(&meal_draft("Chicken", 165, 31, 0, 4))
        .unwrap();

    let summary = service
        .create_diet(&DietDraft {
            meal_ids: vec![eggs.id, rice.id, chicken.id],
        })
        .unwrap();

    assert_eq!(summary.meals.len(), 3);
    assert_eq!(summary.totals.total_calories, 155 + 130 + 165);
    assert_eq!(summary.totals.total_protein, 13 + 3 + 31);
    assert_eq!(summary.totals.total_carbs, 1 + 28);
    assert_eq!(summary.totals.total_oil, 11 + 4);
    assert_eq!(summary.name(), "450 Kcal Diet");
}

#[test]
fn empty_diet_has_zero_totals() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let summary = service.create_diet(&DietDraft::default()).unwrap();
    assert!(summary.meals.is_empty());
    assert_eq!(summary.totals.total_calories, 0);
    assert_eq!(summary.name(), "0 Kcal Diet");
}

#[test]
fn program_keeps_movement_order_and_drops_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let squat = service
        .create_movement(&MovementDraft::new("Squat", "https://videos.example.com/squat"))
        .unwrap();
    let press = service
        .create_movement(&MovementDraft::new("Press", "https://videos.example.com/press"))
        .unwrap();

    let detail = service
        .create_program(&ProgramDraft {
            name: "Strength A".to_string(),
            movement_ids: vec![press.id, squat.id, press.id],
        })
        .unwrap();

    let names: Vec<&str> = detail.movements.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Press", "Squat"]);
    assert_eq!(detail.program.movement_ids, vec![press.id, squat.id]);
}

#[test]
fn linking_unknown_movement_is_a_field_error() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let err = service
        .create_program(&ProgramDraft {
            name: "Ghost".to_string(),
            movement_ids: vec![Uuid::new_v4()],
        })
        .unwrap_err();
    let ServiceError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert!(errors.has_field("movements"));

    assert!(service.list_programs(&ListQuery::default()).unwrap().is_empty());
}

#[test]
fn program_update_replaces_links() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let squat = service
        .create_movement(&MovementDraft::new("Squat", "https://videos.example.com/squat"))
        .unwrap();
    let lunge = service
        .create_movement(&MovementDraft::new("Lunge", "https://videos.example.com/lunge"))
        .unwrap();
    let created = service
        .create_program(&ProgramDraft {
            name: "Legs".to_string(),
            movement_ids: vec![squat.id],
        })
        .unwrap();

    let updated = service
        .update_program(
            created.program.id,
            &ProgramDraft {
                name: "Legs v2".to_string(),
                movement_ids: vec![lunge.id],
            },
        )
        .unwrap();
    assert_eq!(updated.program.name, "Legs v2");
    assert_eq!(updated.movements, vec![lunge]);
}

#[test]
fn deleting_movement_and_meal_unlinks_them() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepository::try_new(&conn).unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let squat = service
        .create_movement(&MovementDraft::new("Squat", "https://videos.example.com/squat"))
        .unwrap();
    let program = service
        .create_program(&ProgramDraft {
            name: "Legs".to_string(),
            movement_ids: vec![squat.id],
        })
        .unwrap();
    let oats = service.create_meal(&meal_draft("Oats", 380, 13, 67, 7)).unwrap();
    let diet = service
        .create_diet(&DietDraft {
            meal_ids: vec![oats.id],
        })
        .unwrap();

    service.delete_movement(squat.id).unwrap();
    service.delete_meal(oats.id).unwrap();

    assert!(repo
        .list_program_movements(program.program.id)
        .unwrap()
        .is_empty());
    assert!(repo.list_diet_meals(diet.diet.id).unwrap().is_empty());

    let summary = service.diet_summary(diet.diet.id).unwrap().unwrap();
    assert_eq!(summary.totals.total_calories, 0);
}

#[test]
fn deleting_missing_program_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());

    let err = service.delete_program(Uuid::new_v4()).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: "program",
            ..
        }
    ));
}

#[test]
fn list_pagination_limits_results() {
    let conn = open_db_in_memory().unwrap();
    let service = CatalogService::new(SqliteRepository::try_new(&conn).unwrap());
    for name in ["A", "B", "C"] {
        service.create_meal(&meal_draft(name, 10, 1, 1, 1)).unwrap();
    }

    let page = service
        .list_meals(&ListQuery {
            limit: Some(2),
            offset: 0,
        })
        .unwrap();
    assert_eq!(page.len(), 2);

    let rest = service
        .list_meals(&ListQuery {
            limit: Some(2),
            offset: 2,
        })
        .unwrap();
    assert_eq!(rest.len(), 1);
}
