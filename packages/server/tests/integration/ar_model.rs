use reqwest::multipart::Form;

use crate::common::{TestApp, file_part, glb_part, routes, usdz_part};

mod ar_model_upload {
    use super::*;

    #[tokio::test]
    async fn kind_defaults_to_extension() {
        let app = TestApp::spawn().await;

        let form = Form::new()
            .part("file", usdz_part("scene.usdz"))
            .text("product_name", "Corner Sofa");
        let res = app.post_multipart(routes::AR_MODELS, form).await;

        assert_eq!(res.status, 201, "{}", res.text);
        let filename = res.str_field("filename").unwrap();
        assert!(filename.starts_with("corner_sofa_ar_"), "{filename}");
        assert!(filename.ends_with(".usdz"));
        assert_eq!(res.body["path"], format!("ar_models/{filename}"));
        assert_eq!(res.body["size"], 256);
        assert!(app.model_path(filename).is_file());
    }

    #[tokio::test]
    async fn explicit_kind_must_match_extension() {
        let app = TestApp::spawn().await;

        let form = Form::new()
            .part("file", usdz_part("scene.usdz"))
            .text("kind", "glb");
        let res = app.post_multipart(routes::AR_MODELS, form).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert!(app.stored_files("ar_models").is_empty());
    }

    #[tokio::test]
    async fn unknown_kind_and_missing_file_are_rejected() {
        let app = TestApp::spawn().await;

        let form = Form::new()
            .part("file", glb_part("m.glb"))
            .text("kind", "fbx");
        assert_eq!(app.post_multipart(routes::AR_MODELS, form).await.status, 400);

        let form = Form::new().text("kind", "glb");
        let res = app.post_multipart(routes::AR_MODELS, form).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        let form = Form::new().part("file", file_part("notes.txt", vec![1; 8], "text/plain"));
        assert_eq!(app.post_multipart(routes::AR_MODELS, form).await.status, 400);
    }

    #[tokio::test]
    async fn unnamed_upload_uses_default_prefix() {
        let app = TestApp::spawn().await;
        let filename = app.upload_model(glb_part("m.glb")).await;
        assert!(filename.starts_with("ar_model_"), "{filename}");
    }
}

mod ar_model_info_and_delete {
    use super::*;

    #[tokio::test]
    async fn info_then_delete_round_trip() {
        let app = TestApp::spawn().await;
        let filename = app.upload_model(glb_part("m.glb")).await;

        let info = app.get(&routes::ar_model(&filename)).await;
        assert_eq!(info.status, 200, "{}", info.text);
        assert_eq!(info.body["filename"], filename.as_str());
        assert_eq!(info.body["size_bytes"], 256);
        assert_eq!(info.body["size_human"], "256.0 B");
        assert_eq!(
            info.body["url"],
            format!("/storage/ar_models/{filename}").as_str()
        );
        assert!(info.body["last_modified"].is_string());

        let res = app.delete(&routes::ar_model(&filename)).await;
        assert_eq!(res.status, 204);
        assert!(!app.model_path(&filename).exists());

        assert_eq!(app.get(&routes::ar_model(&filename)).await.status, 404);
        assert_eq!(app.delete(&routes::ar_model(&filename)).await.status, 404);
    }

    #[tokio::test]
    async fn referenced_model_cannot_be_deleted() {
        let app = TestApp::spawn().await;

        let form = Form::new()
            .text("name", "Desk")
            .text("price", "10")
            .part("glb_model", glb_part("d.glb"));
        let created = app.post_multipart(routes::PRODUCTS, form).await;
        let filename = created.str_field("glb_model").unwrap();

        let res = app.delete(&routes::ar_model(filename)).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");
        assert!(app.model_path(filename).is_file());
    }

    #[tokio::test]
    async fn hidden_names_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::ar_model(".hidden.glb")).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod ar_model_cleanup {
    use super::*;

    #[tokio::test]
    async fn sweep_removes_only_unreferenced_models() {
        let app = TestApp::spawn().await;

        let both = Form::new()
            .text("name", "Chair")
            .text("price", "10")
            .part("glb_model", glb_part("c.glb"))
            .part("usdz_model", usdz_part("c.usdz"));
        assert_eq!(app.post_multipart(routes::PRODUCTS, both).await.status, 201);

        let one = Form::new()
            .text("name", "Table")
            .text("price", "20")
            .part("glb_model", glb_part("t.glb"));
        assert_eq!(app.post_multipart(routes::PRODUCTS, one).await.status, 201);

        let orphan_a = app.upload_model(glb_part("o1.glb")).await;
        let orphan_b = app.upload_model(usdz_part("o2.usdz")).await;
        assert_eq!(app.stored_files("ar_models").len(), 5);

        let res = app.post_empty(routes::AR_MODELS_CLEANUP).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total_files"], 5);
        assert_eq!(res.body["orphaned_files"], 2);
        assert_eq!(res.body["deleted_files"], 2);
        assert_eq!(app.stored_files("ar_models").len(), 3);
        assert!(!app.model_path(&orphan_a).exists());
        assert!(!app.model_path(&orphan_b).exists());

        let again = app.post_empty(routes::AR_MODELS_CLEANUP).await;
        assert_eq!(again.body["total_files"], 3);
        assert_eq!(again.body["orphaned_files"], 0);
    }

    #[tokio::test]
    async fn sweep_on_empty_storage_reports_zero() {
        let app = TestApp::spawn().await;

        let res = app.post_empty(routes::AR_MODELS_CLEANUP).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total_files"], 0);
        assert_eq!(res.body["deleted_files"], 0);
    }
}
