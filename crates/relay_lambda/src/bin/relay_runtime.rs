use aws_sdk_secretsmanager::config::Region;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::uri::{AMQPAuthority, AMQPQueryString, AMQPScheme, AMQPUri, AMQPUserInfo};
use lapin::{BasicProperties, Connection, ConnectionProperties};
use relay_core::contract::InvocationResponse;
use relay_core::credentials::{parse_broker_config, BrokerConfig, RetrievalError};
use relay_lambda::adapters::credentials::CredentialSource;
use relay_lambda::adapters::forward::{DeliveryError, MessageForwarder};
use relay_lambda::handlers::batch::handle_queue_event;
use serde_json::Value;

const DEFAULT_SECRET_NAME: &str = "rabbitmq_credentials";
const DEFAULT_SECRET_REGION: &str = "sa-east-1";

const PERSISTENT_DELIVERY_MODE: u8 = 2;
const AMQP_REPLY_SUCCESS: u16 = 200;

struct SecretsManagerCredentialSource {
    secret_name: String,
    client: aws_sdk_secretsmanager::Client,
}

impl CredentialSource for SecretsManagerCredentialSource {
    fn fetch(&self) -> Result<BrokerConfig, RetrievalError> {
        let client = self.client.clone();
        let secret_id = self.secret_name.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .get_secret_value()
                    .secret_id(&secret_id)
                    .send()
                    .await
                    .map_err(|error| {
                        RetrievalError::new(format!(
                            "failed to read broker secret {secret_id}: {error}"
                        ))
                    })?;
                let secret_string = response.secret_string().ok_or_else(|| {
                    RetrievalError::new(format!(
                        "broker secret {secret_id} does not contain a string payload"
                    ))
                })?;
                parse_broker_config(secret_string)
            })
        })
    }
}

struct AmqpMessageForwarder;

impl MessageForwarder for AmqpMessageForwarder {
    fn forward(&self, config: &BrokerConfig, payload: &[u8]) -> Result<(), DeliveryError> {
        let config = config.clone();
        let body = payload.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(async move { publish_persistent(&config, &body).await })
        })
    }
}

/// Connects, publishes one persistent message, and closes the connection.
/// The connection is owned by this call, so the close runs whenever the
/// connect succeeded regardless of how the channel work turned out.
async fn publish_persistent(config: &BrokerConfig, body: &[u8]) -> Result<(), DeliveryError> {
    let connection = Connection::connect_uri(broker_uri(config), ConnectionProperties::default())
        .await
        .map_err(|error| {
            DeliveryError::new(format!(
                "failed to connect to broker at {}:{}: {error}",
                config.host, config.port
            ))
        })?;

    let outcome = publish_on_connection(&connection, &config.queue, body).await;
    let _ = connection
        .close(AMQP_REPLY_SUCCESS, "forwarding complete")
        .await;
    outcome
}

async fn publish_on_connection(
    connection: &Connection,
    queue: &str,
    body: &[u8],
) -> Result<(), DeliveryError> {
    let channel = connection
        .create_channel()
        .await
        .map_err(|error| DeliveryError::new(format!("failed to open broker channel: {error}")))?;

    channel
        .queue_declare(queue, durable_queue_options(), FieldTable::default())
        .await
        .map_err(|error| {
            DeliveryError::new(format!("failed to declare durable queue {queue}: {error}"))
        })?;

    channel
        .basic_publish(
            "",
            queue,
            BasicPublishOptions::default(),
            body,
            BasicProperties::default().with_delivery_mode(PERSISTENT_DELIVERY_MODE),
        )
        .await
        .map(|_| ())
        .map_err(|error| {
            DeliveryError::new(format!("failed to publish message to queue {queue}: {error}"))
        })
}

fn durable_queue_options() -> QueueDeclareOptions {
    QueueDeclareOptions {
        durable: true,
        ..QueueDeclareOptions::default()
    }
}

fn broker_uri(config: &BrokerConfig) -> AMQPUri {
    AMQPUri {
        scheme: AMQPScheme::AMQP,
        authority: AMQPAuthority {
            userinfo: AMQPUserInfo {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            host: config.host.clone(),
            port: config.port,
        },
        vhost: "/".to_string(),
        query: AMQPQueryString::default(),
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<InvocationResponse, Error> {
    let secret_name =
        std::env::var("RELAY_SECRET_NAME").unwrap_or_else(|_| DEFAULT_SECRET_NAME.to_string());
    let secret_region =
        std::env::var("RELAY_SECRET_REGION").unwrap_or_else(|_| DEFAULT_SECRET_REGION.to_string());

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(secret_region))
        .load()
        .await;
    let credentials = SecretsManagerCredentialSource {
        secret_name,
        client: aws_sdk_secretsmanager::Client::new(&aws_config),
    };

    Ok(handle_queue_event(
        event.payload,
        &credentials,
        &AmqpMessageForwarder,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
