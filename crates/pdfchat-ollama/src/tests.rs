//! Snapshot tests for the Ollama client

#[cfg(test)]
mod snapshot_tests {
    use crate::{GenerationConfig, OllamaConfig};
    use insta::assert_yaml_snapshot;
    use pdfchat_core::AppConfig;

    #[test]
    fn test_config_snapshot() {
        let config = OllamaConfig {
            base_url: "localhost-ollama".to_string(),
            model: "llama3".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            temperature: 0.5,
        };

        assert_yaml_snapshot!(config, @r"
        base_url: localhost-ollama
        model: llama3
        embedding_model: nomic-embed-text
        temperature: 0.5
        ");
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig {
            model: "phi3".to_string(),
            temperature: 0.25,
            ..Default::default()
        };
        let config = OllamaConfig::from_app_config(&app);

        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "phi3");
        assert_eq!(config.embedding_model, "nomic-embed-text");
        assert_eq!(config.temperature, 0.25);
    }

    #[test]
    fn test_default_generation_options() {
        let config = GenerationConfig::default();
        assert_eq!(config.model_id, "llama3");
        assert_eq!(config.top_k, 40);
        assert!((config.top_p - 0.9).abs() < f32::EPSILON);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.timeout.as_secs(), 3600);
    }
}

#[cfg(test)]
mod http_tests {
    use crate::{Embedder, Error, GenerationConfig, LLMProvider, OllamaClient, OllamaConfig};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OllamaClient {
        OllamaClient::new(OllamaConfig::new(server.uri(), "llama3")).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_trimmed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "  Paris is the capital.\n",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let result = client.generate("Capital?", &client.generation_config()).await.unwrap();

        assert_eq!(result.text, "Paris is the capital.");
        assert_eq!(result.model_id, "llama3");
    }

    #[tokio::test]
    async fn test_generate_error_status_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'llama3' not found"))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client.generate("Hi", &client.generation_config()).await.unwrap_err();

        match err {
            Error::LLMProvider(message) => assert!(message.contains("model 'llama3' not found")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "late"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let config = GenerationConfig {
            timeout: Duration::from_millis(100),
            ..client.generation_config()
        };

        assert!(matches!(client.generate("Hi", &config).await, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_generate_stream_stops_at_done() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"response\":\"Par\",\"done\":false}\n",
            "not json at all\n",
            "{\"response\":\"is\",\"done\":false}\n",
            "{\"response\":\"\",\"done\":true}\n",
            "{\"response\":\" ignored\",\"done\":false}"
        );
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = client(&server);
        let mut pieces: Vec<String> = Vec::new();
        let result = client
            .generate_stream("Capital?", &client.generation_config(), &mut |text: &str| {
                pieces.push(text.to_string())
            })
            .await
            .unwrap();

        assert_eq!(pieces, vec!["Par", "is", ""]);
        assert_eq!(result.text, "Paris");
    }

    #[tokio::test]
    async fn test_generate_stream_without_trailing_newline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"response\":\"Hello\"}\n{\"response\":\" world\"}",
            ))
            .mount(&server)
            .await;

        let client = client(&server);
        let result = client
            .generate_stream("Hi", &client.generation_config(), &mut |_: &str| {})
            .await
            .unwrap();

        assert_eq!(result.text, "Hello world");
    }

    #[tokio::test]
    async fn test_list_models_and_connect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "llama3:latest"}, {"name": "nomic-embed-text:latest"}]
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(
            client.list_models().await.unwrap(),
            vec!["llama3:latest", "nomic-embed-text:latest"]
        );
        assert!(client.connect().await.is_ok());

        // a model that isn't pulled only warns
        let missing = client.with_model("mistral");
        assert!(missing.connect().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server_only_warns() {
        let client = OllamaClient::new(OllamaConfig::new("http://127.0.0.1:9", "llama3")).unwrap();
        assert!(client.list_models().await.is_err());
        assert!(client.connect().await.is_ok());
    }

    #[tokio::test]
    async fn test_embed_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(json!({"model": "nomic-embed-text", "input": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embeddings": [[0.1, 0.2], [0.3, 0.4]]
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let vectors = client.embed_batch(&["a".to_string(), "b".to_string()]).await.unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn test_embed_count_mismatch_and_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(json!({"input": ["only"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(json!({"input": ["broken"]})))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(matches!(client.embed("only").await, Err(Error::Embedding(_))));
        assert!(matches!(client.embed("broken").await, Err(Error::Embedding(_))));
    }

    #[tokio::test]
    async fn test_embed_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"embeddings": [[1.0]]}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client(&server).with_embed_timeout(Duration::from_millis(100));
        assert!(matches!(client.embed("slow").await, Err(Error::Timeout(_))));
    }
}
