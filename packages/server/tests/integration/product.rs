use reqwest::multipart::Form;

use crate::common::{
    TestApp, empty_file_part, file_part, glb_bytes, glb_part, routes, usdz_part,
};

fn product_form(name: &str) -> Form {
    Form::new()
        .text("name", name.to_string())
        .text("price", "199.99")
}

mod product_create {
    use super::*;

    #[tokio::test]
    async fn create_with_glb_only_enables_ar() {
        let app = TestApp::spawn().await;

        let form = product_form("Modern Office Chair")
            .text("category", "Chairs")
            .text("width_cm", "60")
            .part("glb_model", glb_part("chair.glb"));
        let res = app.post_multipart(routes::PRODUCTS, form).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Modern Office Chair");
        assert_eq!(res.body["category"], "Chairs");
        assert_eq!(res.body["width_cm"], 60.0);
        assert_eq!(res.body["ar_enabled"], true);
        assert!(res.body["usdz_model"].is_null());

        let glb = res.str_field("glb_model").unwrap();
        assert!(glb.starts_with("modern_office_chair_ar_"), "{glb}");
        assert!(glb.ends_with(".glb"));
        assert_eq!(
            res.str_field("glb_model_url").unwrap(),
            format!("/storage/ar_models/{glb}")
        );
        assert!(app.model_path(glb).is_file());
    }

    #[tokio::test]
    async fn stored_model_is_served_statically() {
        let app = TestApp::spawn().await;

        let form = product_form("Lamp").part("glb_model", glb_part("lamp.glb"));
        let res = app.post_multipart(routes::PRODUCTS, form).await;
        assert_eq!(res.status, 201, "{}", res.text);

        let url = res.str_field("glb_model_url").unwrap().to_string();
        let served = app.get(&url).await;
        assert_eq!(served.status, 200);
        assert_eq!(served.text.len(), 256);
    }

    #[tokio::test]
    async fn staging_directory_is_not_served() {
        let app = TestApp::spawn().await;
        let staged = app.storage_root.join(".tmp").join("partial-upload");
        std::fs::write(&staged, b"half written").unwrap();

        let res = app.get("/storage/.tmp/partial-upload").await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn legacy_field_names_are_accepted() {
        let app = TestApp::spawn().await;

        let form = product_form("Sofa")
            .part("ar_model_glb", glb_part("sofa.glb"))
            .part("ar_model_usdz", usdz_part("sofa.usdz"));
        let res = app.post_multipart(routes::PRODUCTS, form).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.str_field("glb_model").unwrap().ends_with(".glb"));
        assert!(res.str_field("usdz_model").unwrap().ends_with(".usdz"));
        assert_eq!(app.stored_files("ar_models").len(), 2);
    }

    #[tokio::test]
    async fn empty_file_inputs_are_ignored() {
        let app = TestApp::spawn().await;

        let form = product_form("Stool")
            .part("image", empty_file_part())
            .part("glb_model", empty_file_part())
            .part("usdz_model", empty_file_part());
        let res = app.post_multipart(routes::PRODUCTS, form).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["ar_enabled"], false);
        assert!(res.body["image"].is_null());
        assert!(res.body["glb_model"].is_null());
        assert!(app.stored_files("ar_models").is_empty());
        assert!(app.stored_files("images").is_empty());
    }

    #[tokio::test]
    async fn image_is_stored_under_images() {
        let app = TestApp::spawn().await;

        let form = product_form("Oak Desk")
            .part("image", file_part("desk.png", vec![1; 128], "image/png"));
        let res = app.post_multipart(routes::PRODUCTS, form).await;

        assert_eq!(res.status, 201, "{}", res.text);
        let image = res.str_field("image").unwrap();
        assert!(image.starts_with("oak_desk_img_"), "{image}");
        assert!(app.image_path(image).is_file());
        assert_eq!(res.body["ar_enabled"], false);
    }

    #[tokio::test]
    async fn missing_name_or_price_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_multipart(routes::PRODUCTS, Form::new().text("price", "10"))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        let res = app
            .post_multipart(routes::PRODUCTS, Form::new().text("name", "Chair"))
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .post_multipart(
                routes::PRODUCTS,
                Form::new().text("name", "Chair").text("price", "-5"),
            )
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn wrong_extension_in_model_slot_is_rejected() {
        let app = TestApp::spawn().await;

        let form = product_form("Chair").part("glb_model", usdz_part("chair.usdz"));
        let res = app.post_multipart(routes::PRODUCTS, form).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");
        assert!(app.stored_files("ar_models").is_empty());
    }

    #[tokio::test]
    async fn failed_model_discards_already_stored_image() {
        let app = TestApp::spawn().await;

        let form = product_form("Chair")
            .part("image", file_part("chair.jpg", vec![1; 64], "image/jpeg"))
            .part("glb_model", file_part("chair.obj", vec![1; 64], "text/plain"));
        let res = app.post_multipart(routes::PRODUCTS, form).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert!(app.stored_files("images").is_empty());

        let list = app.get(routes::PRODUCTS).await;
        assert_eq!(list.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn oversized_model_is_payload_too_large() {
        let app = TestApp::spawn().await;

        let big = glb_bytes(crate::common::AR_MAX_FILE_SIZE as usize + 1);
        let form = product_form("Chair")
            .part("glb_model", file_part("chair.glb", big, "model/gltf-binary"));
        let res = app.post_multipart(routes::PRODUCTS, form).await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.code(), "PAYLOAD_TOO_LARGE");
        assert!(
            res.body["message"]
                .as_str()
                .unwrap()
                .starts_with("File size exceeds maximum limit of")
        );
        assert!(app.stored_files("ar_models").is_empty());
    }
}

mod product_update {
    use super::*;

    #[tokio::test]
    async fn usdz_upload_keeps_existing_glb() {
        let app = TestApp::spawn().await;

        let created = app
            .post_multipart(
                routes::PRODUCTS,
                product_form("Armchair").part("glb_model", glb_part("a.glb")),
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();
        let glb = created.str_field("glb_model").unwrap().to_string();

        let res = app
            .patch_multipart(
                &routes::product(id),
                Form::new().part("usdz_model", usdz_part("a.usdz")),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.str_field("glb_model"), Some(glb.as_str()));
        let usdz = res.str_field("usdz_model").unwrap();
        assert!(usdz.starts_with("armchair_ar_"), "{usdz}");
        assert_eq!(res.body["ar_enabled"], true);
        assert!(app.model_path(&glb).is_file());
        assert!(app.model_path(usdz).is_file());
    }

    #[tokio::test]
    async fn replacing_a_model_deletes_the_old_file() {
        let app = TestApp::spawn().await;

        let created = app
            .post_multipart(
                routes::PRODUCTS,
                product_form("Bed").part("glb_model", glb_part("bed.glb")),
            )
            .await;
        let id = created.id();
        let old = created.str_field("glb_model").unwrap().to_string();

        let res = app
            .patch_multipart(
                &routes::product(id),
                Form::new().part("glb_model", glb_part("bed-v2.glb")),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let new = res.str_field("glb_model").unwrap();
        assert_ne!(new, old);
        assert!(app.model_path(new).is_file());
        assert!(!app.model_path(&old).exists());
        assert_eq!(app.stored_files("ar_models"), vec![new.to_string()]);
    }

    #[tokio::test]
    async fn rejected_file_leaves_product_untouched() {
        let app = TestApp::spawn().await;

        let created = app
            .post_multipart(
                routes::PRODUCTS,
                product_form("Shelf").part("glb_model", glb_part("shelf.glb")),
            )
            .await;
        let id = created.id();
        let glb = created.str_field("glb_model").unwrap().to_string();

        let res = app
            .patch_multipart(
                &routes::product(id),
                Form::new()
                    .text("name", "Renamed Shelf")
                    .part("glb_model", usdz_part("shelf.usdz")),
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);

        let current = app.get(&routes::product(id)).await;
        assert_eq!(current.body["name"], "Shelf");
        assert_eq!(current.str_field("glb_model"), Some(glb.as_str()));
        assert_eq!(app.stored_files("ar_models"), vec![glb]);
    }

    #[tokio::test]
    async fn text_fields_follow_patch_semantics() {
        let app = TestApp::spawn().await;

        let created = app
            .post_multipart(
                routes::PRODUCTS,
                product_form("Table")
                    .text("description", "Solid walnut")
                    .text("category", "Tables"),
            )
            .await;
        let id = created.id();

        let res = app
            .patch_multipart(
                &routes::product(id),
                Form::new().text("description", "").text("price", "150"),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["description"].is_null());
        assert_eq!(res.body["category"], "Tables");
        assert_eq!(res.body["price"], 150.0);
        assert_eq!(res.body["name"], "Table");
    }

    #[tokio::test]
    async fn renaming_changes_prefix_of_new_files_only() {
        let app = TestApp::spawn().await;
        let id = app.create_product("Old Name").await;

        let res = app
            .patch_multipart(
                &routes::product(id),
                Form::new()
                    .text("name", "New Name")
                    .part("usdz_model", usdz_part("x.usdz")),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(
            res.str_field("usdz_model")
                .unwrap()
                .starts_with("new_name_ar_")
        );
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .patch_multipart(
                &routes::product(9999),
                Form::new().part("glb_model", glb_part("a.glb")),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
        assert!(app.stored_files("ar_models").is_empty());
    }
}

mod product_delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_files_then_row() {
        let app = TestApp::spawn().await;

        let form = product_form("Wardrobe")
            .part("image", file_part("w.gif", vec![1; 32], "image/gif"))
            .part("glb_model", glb_part("w.glb"))
            .part("usdz_model", usdz_part("w.usdz"));
        let created = app.post_multipart(routes::PRODUCTS, form).await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();

        let res = app.delete(&routes::product(id)).await;
        assert_eq!(res.status, 204);
        assert!(app.stored_files("ar_models").is_empty());
        assert!(app.stored_files("images").is_empty());

        let again = app.delete(&routes::product(id)).await;
        assert_eq!(again.status, 404);
        assert_eq!(again.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn missing_file_does_not_block_delete() {
        let app = TestApp::spawn().await;

        let created = app
            .post_multipart(
                routes::PRODUCTS,
                product_form("Bench").part("glb_model", glb_part("b.glb")),
            )
            .await;
        let id = created.id();
        std::fs::remove_file(app.model_path(created.str_field("glb_model").unwrap())).unwrap();

        let res = app.delete(&routes::product(id)).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.get(&routes::product(id)).await.status, 404);
    }
}

mod product_read {
    use super::*;

    #[tokio::test]
    async fn list_is_paginated_newest_first() {
        let app = TestApp::spawn().await;
        for name in ["First", "Second", "Third"] {
            app.create_product(name).await;
        }

        let res = app
            .get(&format!("{}?page=1&per_page=2", routes::PRODUCTS))
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "Third");
        assert_eq!(data[1]["name"], "Second");
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);

        let page2 = app
            .get(&format!("{}?page=2&per_page=2", routes::PRODUCTS))
            .await;
        assert_eq!(page2.body["data"][0]["name"], "First");
    }

    #[tokio::test]
    async fn list_rejects_out_of_range_page() {
        let app = TestApp::spawn().await;
        app.create_product("Only").await;

        let res = app
            .get(&format!("{}?page={}", routes::PRODUCTS, u64::MAX))
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        // Past the last page but still representable: an empty page.
        let res = app
            .get(&format!("{}?page=1000000&per_page=100", routes::PRODUCTS))
            .await;
        assert_eq!(res.status, 200);
        assert!(res.body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_defaults_to_twelve_per_page() {
        let app = TestApp::spawn().await;
        app.create_product("Only").await;

        let res = app.get(routes::PRODUCTS).await;
        assert_eq!(res.body["pagination"]["per_page"], 12);
    }

    #[tokio::test]
    async fn list_filters_by_ar_and_search() {
        let app = TestApp::spawn().await;
        app.create_product("Plain Chair").await;
        let form = product_form("AR Chair").part("glb_model", glb_part("c.glb"));
        assert_eq!(app.post_multipart(routes::PRODUCTS, form).await.status, 201);

        let ar_only = app
            .get(&format!("{}?ar_enabled=true", routes::PRODUCTS))
            .await;
        assert_eq!(ar_only.body["pagination"]["total"], 1);
        assert_eq!(ar_only.body["data"][0]["name"], "AR Chair");

        let search = app.get(&format!("{}?search=plain", routes::PRODUCTS)).await;
        assert_eq!(search.body["pagination"]["total"], 1);
        assert_eq!(search.body["data"][0]["name"], "Plain Chair");
    }

    #[tokio::test]
    async fn ar_view_reports_urls_and_dimensions() {
        let app = TestApp::spawn().await;

        let form = product_form("Lounge")
            .text("width_cm", "80")
            .text("height_cm", "95")
            .text("depth_cm", "85")
            .text("ar_placement_instructions", "Place on the floor")
            .part("glb_model", glb_part("l.glb"));
        let created = app.post_multipart(routes::PRODUCTS, form).await;
        let id = created.id();

        let res = app.get(&routes::product_ar(id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["product_id"], id);
        assert_eq!(res.body["glb_url"], created.body["glb_model_url"]);
        assert!(res.body["usdz_url"].is_null());
        assert_eq!(res.body["dimensions"]["width_cm"], 80.0);
        assert_eq!(res.body["placement_instructions"], "Place on the floor");
    }

    #[tokio::test]
    async fn ar_view_detects_missing_model_file() {
        let app = TestApp::spawn().await;

        let created = app
            .post_multipart(
                routes::PRODUCTS,
                product_form("Ghost").part("glb_model", glb_part("g.glb")),
            )
            .await;
        let id = created.id();
        std::fs::remove_file(app.model_path(created.str_field("glb_model").unwrap())).unwrap();

        let res = app.get(&routes::product_ar(id)).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "DANGLING_REFERENCE");
    }

    #[tokio::test]
    async fn ar_view_requires_a_model() {
        let app = TestApp::spawn().await;
        let id = app.create_product("Flat").await;

        let res = app.get(&routes::product_ar(id)).await;
        assert_eq!(res.status, 404);
    }
}
