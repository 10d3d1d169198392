mod common;

use axum::{
    body::to_bytes,
    http::{header, Method, StatusCode},
};
use tower::ServiceExt;

use common::*;

#[tokio::test]
async fn vacancy_export_is_an_xlsx_attachment() {
    let app = app();
    let vacancy_id = id_of(&create_vacancy(&app, "QA Engineer").await);
    create_candidate(&app, &vacancy_id, "Ana").await;

    let res = app
        .router
        .clone()
        .oneshot(json_request(
            Method::GET,
            &format!("/api/vacancies/{}/export", vacancy_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"vacante_QA_Engineer_"));

    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn exporting_an_unknown_vacancy_is_not_found() {
    let app = app();
    let (status, _) = send(
        &app,
        json_request(
            Method::GET,
            &format!("/api/vacancies/{}/export", uuid::Uuid::new_v4()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
