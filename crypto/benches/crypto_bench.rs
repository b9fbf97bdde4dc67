use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn keccak256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("keccak256_256B", |b| {
        b.iter(|| kyc_crypto::keccak256(black_box(&data)))
    });
}

fn checksum_validate_bench(c: &mut Criterion) {
    let address = "5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    c.bench_function("eip55_validate", |b| {
        b.iter(|| kyc_crypto::validate_checksum(black_box(address)))
    });
}

fn recover_bench(c: &mut Criterion) {
    let kp = kyc_crypto::keypair_from_seed(&[42u8; 32]).unwrap();
    let digest = [7u8; 32];
    let sig = kyc_crypto::sign_digest(&digest, &kp).unwrap();

    c.bench_function("secp256k1_recover_address", |b| {
        b.iter(|| kyc_crypto::recover_address(black_box(&digest), black_box(&sig)))
    });
}

fn webhook_hmac_bench(c: &mut Criterion) {
    let body = vec![0xCDu8; 1024];
    let mac = kyc_crypto::compute_webhook_mac(&body, b"webhook-token").unwrap();

    c.bench_function("webhook_authenticate_1KB", |b| {
        b.iter(|| kyc_crypto::authenticate_webhook(black_box(&body), &mac, b"webhook-token"))
    });
}

criterion_group!(
    benches,
    keccak256_bench,
    checksum_validate_bench,
    recover_bench,
    webhook_hmac_bench,
);
criterion_main!(benches);
