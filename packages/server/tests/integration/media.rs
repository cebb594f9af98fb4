use ::common::storage::MediaStore;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::common::{TestApp, ad_form, routes};

use server::entity::orphan_blob;
use server::media::cleanup::sweep_once;

#[tokio::test]
async fn unparseable_orphan_url_is_ledgered_not_fatal() {
    let app = TestApp::spawn().await;
    let (_, token) = app.create_owner().await;

    // A legacy URL the codec cannot decode becomes part of the listing.
    let service_id = app.service_id().await;
    let form = ad_form("Legacy media", service_id).text("keepImageUrls", r#"["https://x/1.jpg"]"#);
    let created = app
        .post_multipart_with_token(routes::ADVERTISEMENTS, form, &token)
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    let id = created.id();

    // Dropping it must not fail the edit, and the unresolvable URL lands
    // in the ledger for the sweep.
    let form = ad_form("Legacy media", service_id)
        .text("keepImageUrls", "[]")
        .part("newImages", crate::common::image_part("new.jpg", b"NEW"));
    let res = app
        .put_multipart_with_token(&routes::advertisement(id), form, &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let entry = orphan_blob::Entity::find()
        .filter(orphan_blob::Column::Url.eq("https://x/1.jpg"))
        .one(&app.db)
        .await
        .unwrap()
        .expect("orphan ledger entry should exist");
    assert!(entry.last_error.is_some());

    // The sweep drops entries nothing can ever resolve.
    sweep_once(&app.db, &*app.media_store, 5).await.unwrap();
    assert_eq!(
        orphan_blob::Entity::find().count(&app.db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn sweep_deletes_resolvable_orphans_and_clears_ledger() {
    let app = TestApp::spawn().await;

    // A blob exists in storage, referenced only by a ledger entry (the
    // inline cleanup failed transiently in some earlier request).
    let path = "advertisements/1/1700000000000-stray.jpg";
    app.media_store
        .upload(path, b"STRAY", "image/jpeg")
        .await
        .unwrap();
    let url = app
        .media_store
        .mint_read_url(path, std::time::Duration::from_secs(3600))
        .await
        .unwrap();

    let entry = orphan_blob::ActiveModel {
        url: sea_orm::Set(url),
        attempts: sea_orm::Set(1),
        last_error: sea_orm::Set(Some("connection reset".into())),
        created_at: sea_orm::Set(chrono::Utc::now()),
        ..Default::default()
    };
    sea_orm::ActiveModelTrait::insert(entry, &app.db).await.unwrap();

    sweep_once(&app.db, &*app.media_store, 5).await.unwrap();

    assert!(!app.media_store.exists(path).await.unwrap());
    assert_eq!(
        orphan_blob::Entity::find().count(&app.db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn sweep_tolerates_already_deleted_blobs() {
    let app = TestApp::spawn().await;

    // Ledger entry for a blob that is already gone: the sweep treats the
    // delete as idempotent and clears the row.
    let url = app
        .media_store
        .mint_read_url(
            "advertisements/1/1700000000000-gone.jpg",
            std::time::Duration::from_secs(3600),
        )
        .await
        .unwrap();

    let entry = orphan_blob::ActiveModel {
        url: sea_orm::Set(url),
        attempts: sea_orm::Set(0),
        last_error: sea_orm::Set(None),
        created_at: sea_orm::Set(chrono::Utc::now()),
        ..Default::default()
    };
    sea_orm::ActiveModelTrait::insert(entry, &app.db).await.unwrap();

    sweep_once(&app.db, &*app.media_store, 5).await.unwrap();

    assert_eq!(
        orphan_blob::Entity::find().count(&app.db).await.unwrap(),
        0
    );
}
