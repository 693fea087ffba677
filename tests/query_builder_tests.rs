//! Query builder behaviour against a scripted transport

mod common;

use common::{Reply, ScriptedTransport, client};
use serde_json::json;
use tablekit_sdk::{Operator, Pagination, Predicate, SortDirection};

fn rows_reply() -> Reply {
    Reply::json(
        200,
        json!({
            "rows": [{"rowid": 1, "name": "Runner", "price": 120}],
            "total": 41, "page": 1, "page_size": 20, "total_pages": 3
        }),
    )
}

mod encoding_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_query_shape() {
        let transport = ScriptedTransport::new(|_| rows_reply());
        let client = client(transport.clone());

        let result = client
            .from("products")
            .where_op("price", "gte", 10)
            .where_("category", "shoes & boots")
            .order_by("price", "desc")
            .search("trail")
            .offset(0)
            .limit(20)
            .await;

        assert!(result.is_ok());
        assert_eq!(
            transport.paths(),
            vec![
                "/tables/products/rows/?limit=20&offset=0&search=trail&sort=price&order=desc\
                 &price__gte=10&category=shoes%20%26%20boots"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_every_operator_suffix() {
        let transport = ScriptedTransport::new(|_| rows_reply());
        let client = client(transport.clone());
        let mut builder = client.from("t");
        for op in Operator::ALL {
            builder.where_op("c", op, 1);
        }
        builder.execute().await;
        assert_eq!(
            transport.requests()[0].query(),
            Some("c=1&c__gt=1&c__lt=1&c__gte=1&c__lte=1&c__ne=1&c__contains=1&c__icontains=1")
        );
    }

    #[tokio::test]
    async fn test_unknown_operator_falls_back_to_equality() {
        let transport = ScriptedTransport::new(|_| rows_reply());
        let client = client(transport.clone());
        client.from("t").where_op("c", "between", "x").execute().await;
        assert_eq!(transport.requests()[0].query(), Some("c=x"));
    }

    #[tokio::test]
    async fn test_duplicate_predicates_are_kept() {
        let transport = ScriptedTransport::new(|_| rows_reply());
        let client = client(transport.clone());
        client
            .from("t")
            .filter(Predicate::new("price", Operator::Gt, 5))
            .filter(Predicate::new("price", Operator::Lt, 50))
            .where_("price", 20)
            .execute()
            .await;
        assert_eq!(
            transport.requests()[0].query(),
            Some("price__gt=5&price__lt=50&price=20")
        );
    }

    #[tokio::test]
    async fn test_table_name_is_percent_encoded() {
        let transport = ScriptedTransport::new(|_| rows_reply());
        let client = client(transport.clone());
        client.from("my orders").execute().await;
        assert_eq!(transport.paths(), vec!["/tables/my%20orders/rows/".to_string()]);
    }
}

mod execution_tests {
    use super::*;

    #[tokio::test]
    async fn test_result_translation() {
        let transport = ScriptedTransport::new(|_| rows_reply());
        let result = client(transport).from("products").limit(20).await;
        assert_eq!(result.count, 41);
        assert_eq!(
            result.pagination,
            Some(Pagination {
                page: 1,
                limit: 20,
                total_pages: 3
            })
        );
        assert_eq!(result.rows()[0]["name"], json!("Runner"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_repeated_execution_is_byte_identical() {
        let transport = ScriptedTransport::new(|_| rows_reply());
        let client = client(transport.clone());
        let mut builder = client.from("products");
        builder
            .where_op("name", Operator::Ilike, "%run%")
            .order_by("name", SortDirection::Asc);
        let first = builder.execute().await;
        let second = builder.execute().await;
        assert_eq!(first, second);

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url, sent[1].url);
    }

    #[tokio::test]
    async fn test_network_failure_becomes_envelope() {
        let transport = ScriptedTransport::new(|_| Reply::fail("connection reset"));
        let result = client(transport).from("products").execute().await;
        assert!(result.data.is_none());
        assert_eq!(result.error.as_deref(), Some("connection reset"));
        assert!(result.pagination.is_none());
    }

    #[tokio::test]
    async fn test_detail_message_is_used() {
        let transport =
            ScriptedTransport::new(|_| Reply::json(403, json!({"detail": "Invalid API key"})));
        let result = client(transport).from("products").execute().await;
        assert_eq!(result.error.as_deref(), Some("Invalid API key"));
    }

    #[tokio::test]
    async fn test_undecodable_body_becomes_envelope() {
        let transport = ScriptedTransport::new(|_| Reply::json(200, json!("not a row list")));
        let result = client(transport).from("products").execute().await;
        assert!(result.data.is_none());
        assert!(result.error.is_some());
    }
}
