use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod read {
    use divan::Bencher;
    use std::io::Cursor;
    use stdf4::{
        read::{parse, ParseOptions},
        records::{Ptr, StdfRecord},
        CpuType, ValueCodec,
    };

    fn get_input() -> Vec<u8> {
        std::fs::read(format!(
            "{}/resources/sample_le.stdf",
            env!("CARGO_MANIFEST_DIR")
        ))
        .unwrap()
    }

    #[divan::bench]
    fn parse_all(bencher: Bencher) {
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(parse(Cursor::new(data), ParseOptions::default()));
        });
    }

    #[divan::bench]
    fn parse_discard(bencher: Bencher) {
        let options = ParseOptions::builder().discard_records(true).build();
        bencher.with_inputs(get_input).bench_refs(|data| {
            divan::black_box(parse(Cursor::new(data), options));
        });
    }

    #[divan::bench(args = [CpuType::LittleEndian, CpuType::BigEndian])]
    fn decode_ptr(bencher: Bencher, cpu_type: CpuType) {
        let ptr = Ptr {
            test_number: 100,
            head: 1,
            site: 1,
            result: 1.25,
            test_text: Some("Vdd".to_string()),
            ..Default::default()
        };
        let codec = ValueCodec::new(cpu_type);
        let body = ptr.to_bytes(&codec).unwrap().split_off(4);

        bencher
            .with_inputs(|| ValueCodec::new(cpu_type))
            .bench_refs(|codec| {
                divan::black_box(Ptr::decode(&body, codec).unwrap());
            });
    }
}
