use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    DocumentId, LineItem, Money, PaymentMethod, RequestValidator, SaleRequest, Shift,
    Transaction, TransactionNumber,
};

fn make_request(items: usize) -> SaleRequest {
    SaleRequest {
        branch_id: "B1".to_string(),
        shift_id: Some(DocumentId::new("S1")),
        user_id: "U1".to_string(),
        user_name: "Bench".to_string(),
        payment_method: PaymentMethod::Cash,
        items: (0..items)
            .map(|i| LineItem::new(format!("SKU-{i:04}"), format!("Item {i}"), 1))
            .collect(),
        amount_paid: Money::new(100_000),
        total_amount: Money::new(95_000),
        ..Default::default()
    }
}

fn bench_parse_request(c: &mut Criterion) {
    let body = serde_json::to_string(&make_request(20)).unwrap();

    c.bench_function("domain/parse_request_20_items", |b| {
        b.iter(|| {
            let _: SaleRequest = serde_json::from_str(&body).unwrap();
        });
    });
}

fn bench_validate_request(c: &mut Criterion) {
    let request = make_request(20);

    c.bench_function("domain/validate_request_20_items", |b| {
        b.iter(|| {
            RequestValidator::validate("POST", request.clone()).unwrap();
        });
    });
}

fn bench_build_transaction(c: &mut Criterion) {
    let sale = RequestValidator::validate("POST", make_request(20)).unwrap();

    c.bench_function("domain/build_transaction_20_items", |b| {
        b.iter(|| {
            let now = Utc::now();
            Transaction::record(&sale, TransactionNumber::mint(now), now).unwrap();
        });
    });
}

fn bench_shift_totals(c: &mut Criterion) {
    c.bench_function("domain/shift_totals_100_sales", |b| {
        b.iter(|| {
            let mut shift = Shift::default();
            for i in 0..100 {
                let method = if i % 2 == 0 {
                    PaymentMethod::Cash
                } else {
                    PaymentMethod::Other("card".to_string())
                };
                shift = shift
                    .with_sale(Money::new(1000), Money::new(10), &method)
                    .unwrap();
            }
            shift
        });
    });
}

criterion_group!(
    benches,
    bench_parse_request,
    bench_validate_request,
    bench_build_transaction,
    bench_shift_totals
);
criterion_main!(benches);
