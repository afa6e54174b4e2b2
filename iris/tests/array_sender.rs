mod common;

use common::{WAIT, free_port, sender_config, start_table};
use iris::table::{TableClient, TableServer, TableValue};
use iris::{DoubleArraySender, IntegerArraySender, SenderConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::timeout;

const TABLE: &str = "/SmartDashboard";

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_then_value_round_trip() {
        let table = start_table().await;
        let sender = DoubleArraySender::new(sender_config(&table, "NVIDIA ORIN ARRAY TEST")).unwrap();
        assert_eq!(sender.topic(), "/SmartDashboard/NVIDIA ORIN ARRAY TEST");

        let client = TableClient::new("127.0.0.1", table.local_addr().port()).await.unwrap();

        sender.set_default_value(vec![0.0, 0.0, 0.0]);
        timeout(WAIT, sender.flush()).await.unwrap();
        let read = client.get_array::<f64>(TABLE, "NVIDIA ORIN ARRAY TEST").await.unwrap();
        assert_eq!(read, Some(vec![0.0, 0.0, 0.0]));

        sender.send_value(vec![1.0, 2.0, 3.0]);
        timeout(WAIT, sender.flush()).await.unwrap();
        let read = client.get_array::<f64>(TABLE, "NVIDIA ORIN ARRAY TEST").await.unwrap();
        assert_eq!(read, Some(vec![1.0, 2.0, 3.0]));
    }

    #[tokio::test]
    async fn latest_value_overwrites() {
        let table = start_table().await;
        let sender = IntegerArraySender::new(sender_config(&table, "NVIDIA ORIN INT ARRAY TEST")).unwrap();
        for n in 1..=20i64 {
            sender.send_value(vec![n, 2 * n, 3 * n]);
        }
        timeout(WAIT, sender.flush()).await.unwrap();

        let state = table.state();
        let value = state.read().await.get(sender.topic()).unwrap();
        assert_eq!(value, Some(TableValue::IntegerArray(vec![20, 40, 60])));
    }

    #[tokio::test]
    async fn two_senders_keep_independent_keys() {
        let table = start_table().await;
        let doubles = DoubleArraySender::new(sender_config(&table, "NVIDIA ORIN ARRAY TEST")).unwrap();
        let integers = IntegerArraySender::new(sender_config(&table, "NVIDIA ORIN INT ARRAY TEST")).unwrap();

        doubles.send_value(vec![1.0, 2.0, 3.0]);
        integers.send_value(vec![7, 14, 21]);
        timeout(WAIT, doubles.flush()).await.unwrap();
        timeout(WAIT, integers.flush()).await.unwrap();

        let client = TableClient::new("127.0.0.1", table.local_addr().port()).await.unwrap();
        assert_eq!(
            client.get_array::<f64>(TABLE, "NVIDIA ORIN ARRAY TEST").await.unwrap(),
            Some(vec![1.0, 2.0, 3.0])
        );
        assert_eq!(
            client.get_array::<i64>(TABLE, "NVIDIA ORIN INT ARRAY TEST").await.unwrap(),
            Some(vec![7, 14, 21])
        );
        assert_eq!(client.topics().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn special_floats_survive_transport() {
        let table = start_table().await;
        let sender = DoubleArraySender::new(sender_config(&table, "pose")).unwrap();
        sender.send_value(vec![f64::NAN, f64::INFINITY, -0.0, f64::MIN_POSITIVE]);
        timeout(WAIT, sender.flush()).await.unwrap();

        let client = TableClient::new("127.0.0.1", table.local_addr().port()).await.unwrap();
        let read = client.get_array::<f64>(TABLE, "pose").await.unwrap().unwrap();
        assert!(read[0].is_nan());
        assert_eq!(read[1], f64::INFINITY);
        assert!(read[2] == 0.0 && read[2].is_sign_negative());
        assert_eq!(read[3], f64::MIN_POSITIVE);
    }

    #[tokio::test]
    async fn mismatched_kind_is_logged_not_fatal() {
        let table = start_table().await;
        let doubles = DoubleArraySender::new(sender_config(&table, "shared")).unwrap();
        doubles.send_value(vec![1.5]);
        timeout(WAIT, doubles.flush()).await.unwrap();

        let integers = IntegerArraySender::new(sender_config(&table, "shared")).unwrap();
        integers.send_value(vec![1]);
        // Rejected writes still complete a flush
        timeout(WAIT, integers.flush()).await.unwrap();

        let client = TableClient::new("127.0.0.1", table.local_addr().port()).await.unwrap();
        assert_eq!(client.get_array::<f64>(TABLE, "shared").await.unwrap(), Some(vec![1.5]));
        let err = client.get_array::<i64>(TABLE, "shared").await.unwrap_err();
        assert!(err.contains("expected int[]"), "{}", err);

        // The double sender keeps working afterwards
        doubles.send_value(vec![2.5]);
        timeout(WAIT, doubles.flush()).await.unwrap();
        assert_eq!(client.get_array::<f64>(TABLE, "shared").await.unwrap(), Some(vec![2.5]));
    }

    #[tokio::test]
    async fn sender_waits_for_late_server() {
        let port = free_port();
        let config = SenderConfig::new("late")
            .with_server("127.0.0.1", port)
            .with_reconnect_every_ms(20);
        let sender = DoubleArraySender::new(config).unwrap();

        // Values recorded while nobody listens are never an error
        sender.set_default_value(vec![0.0]);
        sender.send_value(vec![4.0, 2.0]);
        assert!(timeout(Duration::from_millis(100), sender.flush()).await.is_err());

        let table = TableServer::bind(SocketAddr::from(([127, 0, 0, 1], port))).await.unwrap();
        timeout(WAIT, sender.flush()).await.unwrap();

        let value = table.state().read().await.get("/SmartDashboard/late").unwrap();
        assert_eq!(value, Some(TableValue::DoubleArray(vec![4.0, 2.0])));
    }

    #[tokio::test]
    async fn invalid_key_fails_at_creation() {
        assert!(DoubleArraySender::new(SenderConfig::new("")).is_err());
        assert!(IntegerArraySender::new(SenderConfig::new("a//b")).is_err());
        assert!(DoubleArraySender::new(SenderConfig::new("pose").with_table_path("Vision")).is_err());
    }

    #[test]
    fn creation_outside_runtime_fails() {
        let err = DoubleArraySender::with_key("pose").err().unwrap();
        assert!(err.contains("tokio runtime"), "{}", err);
    }
}
