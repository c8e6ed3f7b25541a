/**
* filename : main
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use volume_splitter::config::Config;
use volume_splitter::core::{OpenOrderCanceller, OrderObserver, VolumeSplitter};
use volume_splitter::exchange::binance_spot::BinanceSpotExchange;
use volume_splitter::exchange::paper::PaperExchange;
use volume_splitter::exchange::traits::Exchange;
use volume_splitter::models::order::{realized_notional, OrderResult, OrderSide};
use volume_splitter::models::request::VolumeDistributionRequest;
use volume_splitter::utils::logging::{self, LogObserver};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // 설정 로드
    let mut config = Config::load()?;

    // 명령줄 인수 확인
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "paper" {
        config.exchange.use_paper = true;
    }

    // 로깅 초기화
    logging::init(&config.logging.level)?;
    log::info!("설정 로드 완료: {:?}", config.exchange);

    let exchange = build_exchange(&config)?;
    let observer: Arc<dyn OrderObserver> = Arc::new(LogObserver);

    let request = VolumeDistributionRequest {
        total_volume: dec!(10000.0),   // 달러 기준 총 거래대금
        order_count: 5,                // 분할 주문 수
        amount_variance: dec!(50.0),   // 주문별 금액 편차 (위/아래)
        side: OrderSide::Buy,
        price_min: dec!(200.0),        // 가격 하한
        price_max: dec!(300.0),        // 가격 상한
    };

    let mut splitter = VolumeSplitter::new(
        exchange.clone(),
        config.splitter.symbol.clone(),
        observer.clone(),
        StdRng::from_entropy(),
    )
    .with_max_attempts(config.splitter.max_attempts);

    let results = splitter.split_and_submit(&request).await;
    print_results("분할 주문 결과", &results);
    println!("누적 명목 금액: {}", realized_notional(&results));

    let canceller = OpenOrderCanceller::new(exchange, observer);
    let cancelled = canceller.cancel_all_open_orders().await;
    print_results("미체결 주문 취소 결과", &cancelled);

    Ok(())
}

fn build_exchange(config: &Config) -> Result<Arc<RwLock<dyn Exchange>>, anyhow::Error> {
    if config.exchange.use_paper {
        log::info!("모의 거래소 사용: {}", config.splitter.symbol);
        let paper = PaperExchange::new().with_symbol(&config.splitter.symbol, "0.01000000", "0.00010000");
        return Ok(Arc::new(RwLock::new(paper)));
    }

    let binance = BinanceSpotExchange::from_config(&config.exchange)?;
    log::info!("Binance 연결: {}", config.exchange.rest_base_url());
    Ok(Arc::new(RwLock::new(binance)))
}

fn print_results(title: &str, results: &[OrderResult]) {
    println!("\n=== {} ({}건) ===", title, results.len());
    for result in results {
        match result {
            Ok(order) => println!("{:#?}", order),
            Err(e) => println!("오류: {}", e),
        }
    }
}
