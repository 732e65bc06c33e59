mod common;

use std::sync::Arc;

use common::MockExchange;
use rust_decimal::Decimal;

use cryptofolio::exchange::ExchangeApi;
use cryptofolio::models::Side;

#[tokio::test]
async fn market_buy_spends_quote_amount() {
    let exchange: Arc<dyn ExchangeApi> = Arc::new(MockExchange::new());

    let receipt = exchange
        .place_order(Side::Buy, "BTCUSDT", Decimal::from(100))
        .await
        .unwrap();

    assert_eq!(receipt.order_id, "mock-1");
    assert_eq!(receipt.status, "FILLED");
}

#[tokio::test]
async fn orders_record_side_pair_and_amount() {
    let exchange = MockExchange::new();

    exchange
        .place_order(Side::Buy, "ETHUSDT", Decimal::from(250))
        .await
        .unwrap();
    exchange
        .place_order(Side::Sell, "ETHUSDT", Decimal::new(5, 1))
        .await
        .unwrap();

    let orders = exchange.placed_orders.lock().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0], (Side::Buy, "ETHUSDT".into(), Decimal::from(250)));
    assert_eq!(orders[1], (Side::Sell, "ETHUSDT".into(), Decimal::new(5, 1)));
}

#[tokio::test]
async fn rejected_order_surfaces_the_error() {
    let exchange = MockExchange::new().failing("BTCUSDT");

    let result = exchange
        .place_order(Side::Buy, "BTCUSDT", Decimal::from(100))
        .await;

    assert!(result.is_err());
}
