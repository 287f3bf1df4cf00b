#[cfg(test)]
mod sheet_client_tests {
    use directoryserver::sheet::{
        CallLogEntry, CallLogSink, GoogleSheetsClient, GoogleSheetsConfig, SheetError, SheetValue,
    };
    use directoryserver::tests::test_util::setup;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SPREADSHEET_ID: &str = "sheet123";

    fn write_credentials(dir: &TempDir, token_uri: &str) -> PathBuf {
        let private_key = include_str!("fixtures/test_service_account_key.pem");
        let creds = json!({
            "type": "service_account",
            "client_email": "call-logger@test-project.iam.gserviceaccount.com",
            "private_key_id": "test-key-id",
            "private_key": private_key,
            "token_uri": token_uri,
        });
        let path = dir.path().join("creds.json");
        std::fs::write(&path, creds.to_string()).unwrap();
        path
    }

    fn client_for(server: &ServerGuard, dir: &TempDir) -> GoogleSheetsClient {
        let creds = write_credentials(dir, &format!("{}/token", server.url()));
        let mut config = GoogleSheetsConfig::new(creds, "Formi_Call_Logs");
        config.sheets_api_url = format!("{}/sheets", server.url());
        config.drive_api_url = format!("{}/drive", server.url());
        GoogleSheetsClient::new(config)
    }

    fn entry() -> CallLogEntry {
        CallLogEntry {
            phone_number: Some(SheetValue::from("+91 98765 43210")),
            call_outcome: Some(SheetValue::from("booked")),
            ..Default::default()
        }
    }

    async fn mock_token(server: &mut ServerGuard, expected_calls: usize) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .match_body(Matcher::Regex("grant_type=urn%3Aietf".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.test","expires_in":3600,"token_type":"Bearer"}"#)
            .expect(expected_calls)
            .create_async()
            .await
    }

    async fn mock_drive_lookup(
        server: &mut ServerGuard,
        files: serde_json::Value,
        expected_calls: usize,
    ) -> mockito::Mock {
        server
            .mock("GET", "/drive/files")
            .match_query(Matcher::UrlEncoded(
                "q".to_string(),
                "name = 'Formi_Call_Logs' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
                    .to_string(),
            ))
            .match_header("authorization", "Bearer ya29.test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "files": files }).to_string())
            .expect(expected_calls)
            .create_async()
            .await
    }

    async fn mock_worksheets(server: &mut ServerGuard, expected_calls: usize) -> mockito::Mock {
        server
            .mock("GET", format!("/sheets/spreadsheets/{SPREADSHEET_ID}").as_str())
            .match_query(Matcher::UrlEncoded(
                "fields".to_string(),
                "sheets.properties".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "sheets": [
                        { "properties": { "title": "Archive", "index": 1 } },
                        { "properties": { "title": "Calls", "index": 0 } }
                    ]
                })
                .to_string(),
            )
            .expect(expected_calls)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_append_reuses_access_token() {
        setup();
        let dir = TempDir::new().unwrap();
        let mut server = Server::new_async().await;

        let token = mock_token(&mut server, 1).await;
        let lookup = mock_drive_lookup(&mut server, json!([{ "id": SPREADSHEET_ID, "name": "Formi_Call_Logs" }]), 2).await;
        let worksheets = mock_worksheets(&mut server, 2).await;
        let append = server
            .mock(
                "POST",
                Matcher::Regex(format!(
                    r"^/sheets/spreadsheets/{SPREADSHEET_ID}/values/%27Calls%27:append"
                )),
            )
            .match_header("authorization", "Bearer ya29.test")
            .match_body(Matcher::Regex(
                r#"^\{"values":\[\["\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}","\+91 98765 43210","booked","NA","NA","NA","NA","NA","NA"\]\]\}$"#
                    .to_string(),
            ))
            .with_status(200)
            .with_body("{}")
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server, &dir);
        client.append_log_row(&entry()).await.unwrap();
        client.append_log_row(&entry()).await.unwrap();

        token.assert_async().await;
        lookup.assert_async().await;
        worksheets.assert_async().await;
        append.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_spreadsheet_is_not_found() {
        setup();
        let dir = TempDir::new().unwrap();
        let mut server = Server::new_async().await;

        let _token = mock_token(&mut server, 1).await;
        let _lookup = mock_drive_lookup(&mut server, json!([]), 1).await;

        let client = client_for(&server, &dir);
        let err = client.append_log_row(&entry()).await.unwrap_err();
        assert_eq!(
            err,
            SheetError::NotFound("spreadsheet 'Formi_Call_Logs' not found".to_string())
        );
        assert_eq!(
            err.to_string(),
            "Could not open sheet: spreadsheet 'Formi_Call_Logs' not found"
        );
    }

    #[tokio::test]
    async fn test_rejected_append_is_write_error() {
        setup();
        let dir = TempDir::new().unwrap();
        let mut server = Server::new_async().await;

        let _token = mock_token(&mut server, 1).await;
        let _lookup = mock_drive_lookup(&mut server, json!([{ "id": SPREADSHEET_ID }]), 1).await;
        let _worksheets = mock_worksheets(&mut server, 1).await;
        let _append = server
            .mock("POST", Matcher::Regex(r"/values/.+:append".to_string()))
            .with_status(403)
            .with_body("caller does not have permission")
            .create_async()
            .await;

        let client = client_for(&server, &dir);
        let err = client.append_log_row(&entry()).await.unwrap_err();
        assert!(matches!(err, SheetError::Write(_)));
        let message = err.to_string();
        assert!(message.starts_with("Error appending row: 403"));
        assert!(message.contains("caller does not have permission"));
    }

    #[tokio::test]
    async fn test_rejected_token_is_auth_error() {
        setup();
        let dir = TempDir::new().unwrap();
        let mut server = Server::new_async().await;

        let _token = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;
        let lookup = mock_drive_lookup(&mut server, json!([]), 0).await;

        let client = client_for(&server, &dir);
        let err = client.append_log_row(&entry()).await.unwrap_err();
        assert!(matches!(err, SheetError::Auth(_)));
        assert!(err.to_string().contains("invalid_grant"));
        lookup.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_key_file_is_auth_error() {
        setup();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, "not json").unwrap();

        let client = GoogleSheetsClient::new(GoogleSheetsConfig::new(path, "Formi_Call_Logs"));
        let err = client.access_token().await.unwrap_err();
        assert!(err.to_string().starts_with("Authentication failed: invalid key file"));
    }
}
