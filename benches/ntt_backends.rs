use bls12_381_ntt_diff::device::{ComputeDevice, HostDevice, StreamHandle};
use bls12_381_ntt_diff::ntt::{NttConfig, NttDir, NttInitDomainConfig, NttOrdering};
use bls12_381_ntt_diff::{datagen, Backend, RootsOfUnity, RunConfig, Scalar, TransformSpec};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

const MAX_LOG_SIZE: u32 = 16;

fn device_with_domain(fast_twiddles: bool) -> HostDevice<Scalar> {
    let device = HostDevice::new();
    device
        .init_domain(Scalar::omega(MAX_LOG_SIZE), &NttInitDomainConfig { fast_twiddles })
        .expect("Failed to initialize domain");
    device
}

fn bench_backends_by_size(c: &mut Criterion) {
    let device = device_with_domain(true);
    let mut group = c.benchmark_group("NTT backends");

    for k in [10u32, 12, 14, 16] {
        let size = 1usize << k;
        let input: Vec<Scalar> = datagen::generate(datagen::InputKind::Random, size, 1);
        let src = device.malloc(size).unwrap();
        let dst = device.malloc(size).unwrap();
        device.copy_to_device(src, &input, StreamHandle::DEFAULT).unwrap();

        let spec = TransformSpec { log_size: k, direction: NttDir::Forward, ordering: NttOrdering::NN };

        for backend in Backend::ALL {
            let cfg = NttConfig { is_async: false, ..spec.ntt_config(StreamHandle::DEFAULT, backend) };
            group.bench_with_input(BenchmarkId::new(backend.label(), format!("2^{}", k)), &size, |b, &size| {
                b.iter(|| black_box(device.ntt(src, size, NttDir::Forward, &cfg, dst).unwrap()));
            });
        }

        device.free(src).unwrap();
        device.free(dst).unwrap();
    }

    group.finish();
}

fn bench_inverse_twiddle_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("Inverse NTT twiddles");
    let k = 14u32;
    let size = 1usize << k;
    let input: Vec<Scalar> = datagen::generate(datagen::InputKind::Random, size, 2);

    for fast_twiddles in [false, true] {
        let device = device_with_domain(fast_twiddles);
        let buf = device.malloc(size).unwrap();
        device.copy_to_device(buf, &input, StreamHandle::DEFAULT).unwrap();
        let cfg = NttConfig {
            are_inputs_on_device: true,
            are_outputs_on_device: true,
            ..NttConfig::default()
        };

        let label = if fast_twiddles { "fast" } else { "mirrored" };
        group.bench_function(BenchmarkId::new(label, format!("2^{}", k)), |b| {
            b.iter(|| black_box(device.ntt(buf, size, NttDir::Inverse, &cfg, buf).unwrap()));
        });
        device.free(buf).unwrap();
    }

    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("Differential run");
    group.sample_size(10);

    for inplace in [true, false] {
        let cfg = RunConfig { log_size: 12, inplace, iterations: 4, ..RunConfig::default() };
        group.bench_function(BenchmarkId::new("inplace", inplace), |b| {
            b.iter(|| {
                let device = HostDevice::<Scalar>::new();
                black_box(bls12_381_ntt_diff::run(&device, &cfg).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_backends_by_size, bench_inverse_twiddle_modes, bench_full_run);
criterion_main!(benches);
