use ::common::storage::MediaStore;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::common::{TestApp, ad_form, image_part, image_urls, routes};

use server::entity::{
    advertisement, advertisement_archive, advertisement_image, advertisement_species, booking,
    review, saved_advertisement,
};

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_archives_snapshot_then_removes_rows_and_blobs() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_owner().await;

        let created = app
            .create_advertisement(&token, "Archived walk", &[("a.jpg", b"A"), ("b.jpg", b"B")])
            .await;
        let id = created.id();
        let urls = image_urls(&created.body);
        let paths: Vec<String> = urls
            .iter()
            .map(|u| ::common::storage::url::extract_path(u).unwrap())
            .collect();

        let res = app.delete_with_token(&routes::advertisement(id), &token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        // The snapshot carries the scalar fields and the ordered URL list.
        let snapshot = advertisement_archive::Entity::find()
            .filter(advertisement_archive::Column::AdvertisementId.eq(id))
            .one(&app.db)
            .await
            .unwrap()
            .expect("archive record should exist");
        assert_eq!(snapshot.title, "Archived walk");
        assert_eq!(snapshot.status, "ACTIVE");
        let archived_urls: Vec<String> =
            serde_json::from_value(snapshot.image_urls.clone()).unwrap();
        assert_eq!(archived_urls, urls);

        // Live rows are gone.
        assert_eq!(app.get_without_token(&routes::advertisement(id)).await.status, 404);
        let image_count = advertisement_image::Entity::find()
            .filter(advertisement_image::Column::AdvertisementId.eq(id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(image_count, 0);

        // Blobs are physically removed after the commit.
        for path in &paths {
            assert!(!app.media_store.exists(path).await.unwrap());
        }
    }

    #[tokio::test]
    async fn delete_cascades_bookings_reviews_and_saved_references() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_owner().await;

        let created = app
            .create_advertisement(&token, "Cascade", &[("a.jpg", b"A")])
            .await;
        let id = created.id();

        let (customer_id, _) = app.create_user().await;
        let booking_id = app.create_booking(id, customer_id).await;
        app.create_review(booking_id, 5).await;
        app.save_advertisement(customer_id, id).await;

        let res = app.delete_with_token(&routes::advertisement(id), &token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        assert_eq!(
            booking::Entity::find()
                .filter(booking::Column::AdvertisementId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            review::Entity::find()
                .filter(review::Column::BookingId.eq(booking_id))
                .count(&app.db)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            saved_advertisement::Entity::find()
                .filter(saved_advertisement::Column::AdvertisementId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            advertisement_species::Entity::find()
                .filter(advertisement_species::Column::AdvertisementId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let app = TestApp::spawn().await;
        let (_, owner_token) = app.create_owner().await;
        let (_, intruder_token) = app.create_owner().await;

        let created = app
            .create_advertisement(&owner_token, "Keep me", &[("a.jpg", b"A")])
            .await;
        let id = created.id();
        let path = ::common::storage::url::extract_path(&image_urls(&created.body)[0]).unwrap();

        let res = app
            .delete_with_token(&routes::advertisement(id), &intruder_token)
            .await;
        assert_eq!(res.status, 403);

        // Listing and blob untouched, no archive written.
        assert_eq!(app.get_without_token(&routes::advertisement(id)).await.status, 200);
        assert!(app.media_store.exists(&path).await.unwrap());
        assert_eq!(
            advertisement_archive::Entity::find()
                .filter(advertisement_archive::Column::AdvertisementId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn delete_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;
        let res = app
            .client
            .delete(format!("http://{}{}", app.addr, routes::advertisement(1)))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 401);
    }
}

mod restore {
    use super::*;

    #[tokio::test]
    async fn restore_recreates_listing_from_snapshot() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_owner().await;

        let service_id = app.service_id().await;
        let form = ad_form("Phoenix", service_id)
            .text("price", "24.50")
            .text("description", "Back from the archive")
            .part("newImages", image_part("a.jpg", b"A"))
            .part("newImages", image_part("b.jpg", b"B"));
        let created = app
            .post_multipart_with_token(routes::ADVERTISEMENTS, form, &token)
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();
        let urls = image_urls(&created.body);

        let res = app.delete_with_token(&routes::advertisement(id), &token).await;
        assert_eq!(res.status, 204);

        let res = app
            .post_with_token(&routes::advertisement_restore(id), &token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        // New identity, archived content.
        let new_id = res.id();
        assert_ne!(new_id, id);
        assert_eq!(res.body["title"].as_str().unwrap(), "Phoenix");
        assert_eq!(
            res.body["description"].as_str().unwrap(),
            "Back from the archive"
        );
        assert_eq!(image_urls(&res.body), urls);

        // The snapshot is consumed.
        assert_eq!(
            advertisement_archive::Entity::find()
                .filter(advertisement_archive::Column::AdvertisementId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn restore_without_archive_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_owner().await;

        let res = app
            .post_with_token(&routes::advertisement_restore(987_654), &token)
            .await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn restore_conflicts_when_title_was_reused() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_owner().await;

        let created = app
            .create_advertisement(&token, "Recycled", &[("a.jpg", b"A")])
            .await;
        let id = created.id();

        app.delete_with_token(&routes::advertisement(id), &token).await;
        // A new listing takes the same title before the restore happens.
        app.create_advertisement(&token, "Recycled", &[("b.jpg", b"B")])
            .await;

        let res = app
            .post_with_token(&routes::advertisement_restore(id), &token)
            .await;
        assert_eq!(res.status, 409);

        // A failed restore keeps the snapshot for a later attempt.
        assert_eq!(
            advertisement_archive::Entity::find()
                .filter(advertisement_archive::Column::AdvertisementId.eq(id))
                .count(&app.db)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn restore_by_non_owner_is_forbidden() {
        let app = TestApp::spawn().await;
        let (_, owner_token) = app.create_owner().await;
        let (_, intruder_token) = app.create_owner().await;

        let created = app
            .create_advertisement(&owner_token, "Private phoenix", &[("a.jpg", b"A")])
            .await;
        let id = created.id();
        app.delete_with_token(&routes::advertisement(id), &owner_token)
            .await;

        let res = app
            .post_with_token(&routes::advertisement_restore(id), &intruder_token)
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn live_count_unaffected_by_archive_rows() {
        // Archives have a lifetime independent of the live table.
        let app = TestApp::spawn().await;
        let (_, token) = app.create_owner().await;

        let created = app
            .create_advertisement(&token, "Counted", &[("a.jpg", b"A")])
            .await;
        app.delete_with_token(&routes::advertisement(created.id()), &token)
            .await;

        assert_eq!(
            advertisement::Entity::find().count(&app.db).await.unwrap(),
            0
        );
        assert_eq!(
            advertisement_archive::Entity::find()
                .count(&app.db)
                .await
                .unwrap(),
            1
        );
    }
}
