// ==========================================
// 名册导入端到端测试
// ==========================================
// 覆盖: 新建/更新计数、逐行隔离、幂等重导、整单失败、院系隔离、xlsx 数字单元格
// ==========================================

use elective_registration::api::{ApiError, UPLOAD_COMPLETED_MSG};
use elective_registration::auth::AuthError;
use elective_registration::config::config_keys;
use elective_registration::domain::{Branch, Role};

use test_helpers::{
    admin_ctx, build_xlsx, create_test_state, roster_header_cells, write_csv, write_roster_csv,
    XlsxCell,
};

#[tokio::test]
async fn test_valid_and_missing_field_rows() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Cse);

    let file = write_roster_csv(&[["A", "R1", "A", "123", "3"], ["B", "", "B", "456", "3"]]);
    let response = state
        .import_api
        .upload_students_from_path(&admin, file.path())
        .await
        .unwrap();

    assert_eq!(response.msg, UPLOAD_COMPLETED_MSG);
    assert_eq!(response.results.created, 1);
    assert_eq!(response.results.updated, 0);
    assert_eq!(response.results.errors.len(), 1);
    assert!(response.results.errors[0].starts_with("Row missing required fields: "));
    assert!(response.results.errors[0].contains("\"Name\":\"B\""));
    assert!(!response.results.errors[0].contains("456"));

    let stored = state.students.find_by_roll_no("R1").unwrap().unwrap();
    assert_eq!(stored.name, "A");
    assert_eq!(stored.semester, 3);
    assert_eq!(stored.branch, Branch::Cse);
    assert_eq!(stored.role, Role::Student);
    assert_ne!(stored.password_hash, "123");
}

#[tokio::test]
async fn test_reimport_updates_without_creating() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::It);

    let rows = [
        ["Alice", "21IT001", "A", "pw1", "5"],
        ["Bob", "21IT002", "B", "pw2", "5"],
        ["Carol", "21IT003", "A", "pw3", "5"],
    ];
    let first = state
        .import_api
        .upload_students_from_path(&admin, write_roster_csv(&rows).path())
        .await
        .unwrap();
    assert_eq!((first.results.created, first.results.updated), (3, 0));

    let second = state
        .import_api
        .upload_students_from_path(&admin, write_roster_csv(&rows).path())
        .await
        .unwrap();
    assert_eq!((second.results.created, second.results.updated), (0, 3));
    assert!(second.results.errors.is_empty());

    let views = state.admin_api.list_students(&admin).unwrap();
    let rolls: Vec<_> = views.iter().map(|v| v.roll_no.as_str()).collect();
    assert_eq!(rolls, vec!["21IT001", "21IT002", "21IT003"]);
}

#[tokio::test]
async fn test_update_overwrites_fields_and_rehashes_secret() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Cse);

    let first = write_roster_csv(&[["Alice", "R1", "A", "old", "3"]]);
    state
        .import_api
        .upload_students_from_path(&admin, first.path())
        .await
        .unwrap();
    let before = state.students.find_by_roll_no("R1").unwrap().unwrap();

    let second = write_roster_csv(&[["Alicia", "R1", "C", "new", "4"]]);
    let response = state
        .import_api
        .upload_students_from_path(&admin, second.path())
        .await
        .unwrap();
    assert_eq!(response.results.updated, 1);

    let after = state.students.find_by_roll_no("R1").unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.roll_no, "R1");
    assert_eq!(after.name, "Alicia");
    assert_eq!(after.section, "C");
    assert_eq!(after.semester, 4);

    assert!(state.auth.login("R1", "new").is_ok());
    assert!(matches!(
        state.auth.login("R1", "old"),
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_one_bad_row_does_not_abort_batch() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Ece);

    let file = write_roster_csv(&[
        ["A", "R1", "A", "x", "2"],
        ["B", "R2", "A", "x", "two"],
        ["C", "R3", "A", "x", "2"],
        ["D", "R4", "A", "x", "2"],
    ]);
    let response = state
        .import_api
        .upload_students_from_path(&admin, file.path())
        .await
        .unwrap();

    assert_eq!(response.results.created, 3);
    assert_eq!(response.results.errors.len(), 1);
    assert!(response.results.errors[0].starts_with("Error processing row "));
    assert!(state.students.find_by_roll_no("R2").unwrap().is_none());
}

#[tokio::test]
async fn test_branch_comes_from_admin_not_sheet() {
    let (_db, state) = create_test_state().await;
    let mech_admin = admin_ctx(&state, Branch::Mechanical);
    let civil_admin = admin_ctx(&state, Branch::Civil);

    let file = write_roster_csv(&[["A", "R1", "A", "x", "1"]]);
    state
        .import_api
        .upload_students_from_path(&mech_admin, file.path())
        .await
        .unwrap();

    assert_eq!(state.admin_api.list_students(&mech_admin).unwrap().len(), 1);
    assert!(state.admin_api.list_students(&civil_admin).unwrap().is_empty());

    // 其他院系管理员重新导入同一学号：记录转入其院系
    state
        .import_api
        .upload_students_from_path(&civil_admin, file.path())
        .await
        .unwrap();
    let moved = state.students.find_by_roll_no("R1").unwrap().unwrap();
    assert_eq!(moved.branch, Branch::Civil);
}

#[tokio::test]
async fn test_admin_account_cannot_be_overwritten_by_roster() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Cse);

    let file = write_roster_csv(&[["Mallory", "adminit001", "A", "pwned", "3"]]);
    let response = state
        .import_api
        .upload_students_from_path(&admin, file.path())
        .await
        .unwrap();

    assert_eq!(response.results.written(), 0);
    assert_eq!(response.results.errors.len(), 1);

    let it_admin = state.students.find_by_roll_no("adminit001").unwrap().unwrap();
    assert_eq!(it_admin.role, Role::Admin);
    assert_eq!(it_admin.name, "IT Admin");
}

#[tokio::test]
async fn test_whole_request_failures() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Cse);

    // 空负载
    let err = state.import_api.upload_students(&admin, &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::NoFileUploaded));
    assert_eq!(err.to_string(), "No file uploaded");

    // 无法解析的工作簿
    let err = state
        .import_api
        .upload_students(&admin, b"not a spreadsheet")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));

    // 超过已配置的行数上限：整单拒绝，不写入任何行
    state
        .config
        .set_global_config_value(config_keys::IMPORT_MAX_ROWS, "1")
        .unwrap();
    let file = write_roster_csv(&[["A", "R1", "A", "x", "1"], ["B", "R2", "A", "x", "1"]]);
    let err = state
        .import_api
        .upload_students_from_path(&admin, file.path())
        .await
        .unwrap_err();
    match &err {
        ApiError::RowLimitExceeded { actual, limit } => assert_eq!((*actual, *limit), (2, 1)),
        other => panic!("Expected RowLimitExceeded, got {:?}", other),
    }
    assert_eq!(err.code(), "INVALID_INPUT");
    assert!(state.students.find_by_roll_no("R1").unwrap().is_none());
}

#[tokio::test]
async fn test_missing_column_reported_per_row() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Cse);

    let file = write_csv(
        "Name,RollNo,Section,Password",
        &[["A", "R1", "A", "123"], ["B", "R2", "B", "456"]],
    );
    let response = state
        .import_api
        .upload_students_from_path(&admin, file.path())
        .await
        .unwrap();

    assert_eq!(response.msg, UPLOAD_COMPLETED_MSG);
    assert_eq!((response.results.created, response.results.updated), (0, 0));
    assert_eq!(response.results.errors.len(), 2);
    for (error, roll_no) in response.results.errors.iter().zip(["R1", "R2"]) {
        assert!(error.starts_with("Row missing required fields: "));
        assert!(error.contains(&format!("\"RollNo\":\"{}\"", roll_no)));
    }
    assert!(state.students.find_by_roll_no("R1").unwrap().is_none());
}

#[tokio::test]
async fn test_no_row_limit_by_default() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Civil);

    let rows: Vec<[String; 5]> = (1..=25)
        .map(|i| {
            [
                format!("Student {}", i),
                format!("CV{:03}", i),
                "A".to_string(),
                "pw".to_string(),
                "1".to_string(),
            ]
        })
        .collect();
    let rows: Vec<[&str; 5]> = rows
        .iter()
        .map(|r| [r[0].as_str(), r[1].as_str(), r[2].as_str(), r[3].as_str(), r[4].as_str()])
        .collect();

    let response = state
        .import_api
        .upload_students_from_path(&admin, write_roster_csv(&rows).path())
        .await
        .unwrap();
    assert_eq!(response.results.created, 25);
    assert!(response.results.errors.is_empty());
}

#[tokio::test]
async fn test_xlsx_upload_reads_first_sheet_with_numeric_cells() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Cse);

    let bytes = build_xlsx(&[
        (
            "Roster",
            vec![
                roster_header_cells(),
                vec![
                    XlsxCell::Text("Alice"),
                    XlsxCell::Number(21001.0),
                    XlsxCell::Text("A"),
                    XlsxCell::Number(123.0),
                    XlsxCell::Number(3.0),
                ],
                vec![
                    XlsxCell::Text("Bob"),
                    XlsxCell::Blank,
                    XlsxCell::Text("B"),
                    XlsxCell::Number(456.0),
                    XlsxCell::Number(3.0),
                ],
            ],
        ),
        (
            "Ignored",
            vec![
                roster_header_cells(),
                vec![
                    XlsxCell::Text("Eve"),
                    XlsxCell::Number(29999.0),
                    XlsxCell::Text("C"),
                    XlsxCell::Number(999.0),
                    XlsxCell::Number(2.0),
                ],
            ],
        ),
    ]);

    let response = state.import_api.upload_students(&admin, &bytes).await.unwrap();
    assert_eq!(response.results.created, 1);
    assert_eq!(response.results.updated, 0);
    assert_eq!(response.results.errors.len(), 1);
    assert!(response.results.errors[0].starts_with("Row missing required fields: "));
    assert!(response.results.errors[0].contains("\"Name\":\"Bob\""));

    assert!(state.students.find_by_roll_no("29999").unwrap().is_none());

    let stored = state.students.find_by_roll_no("21001").unwrap().unwrap();
    assert_eq!(stored.semester, 3);
    let ctx = state.auth.login("21001", "123").unwrap();
    assert_eq!(ctx.semester, 3);
}

#[tokio::test]
async fn test_students_cannot_upload() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Cse);

    let file = write_roster_csv(&[["A", "R1", "A", "pw", "3"]]);
    state
        .import_api
        .upload_students_from_path(&admin, file.path())
        .await
        .unwrap();

    let student = state.auth.login("R1", "pw").unwrap();
    let err = state
        .import_api
        .upload_students_from_path(&student, file.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn test_semester_range_is_configurable() {
    let (_db, state) = create_test_state().await;
    let admin = admin_ctx(&state, Branch::Aids);
    state
        .config
        .set_global_config_value(config_keys::SEMESTER_MAX, "10")
        .unwrap();

    let file = write_roster_csv(&[["A", "R1", "A", "x", "10"], ["B", "R2", "A", "x", "11"]]);
    let response = state
        .import_api
        .upload_students_from_path(&admin, file.path())
        .await
        .unwrap();

    assert_eq!(response.results.created, 1);
    assert_eq!(response.results.errors.len(), 1);
    assert!(response.results.errors[0].contains("outside 1..=10"));
}
