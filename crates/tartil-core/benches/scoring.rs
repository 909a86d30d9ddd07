use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tartil_core::normalize::normalize;
use tartil_core::reward::calculate_xp_reward;
use tartil_core::scoring::{score, word_edit_distance};

const AYAT_AL_KURSI: &str = "اللَّهُ لَا إِلَٰهَ إِلَّا هُوَ الْحَيُّ الْقَيُّومُ ۚ لَا تَأْخُذُهُ سِنَةٌ وَلَا نَوْمٌ ۚ لَّهُ مَا فِي السَّمَاوَاتِ وَمَا فِي الْأَرْضِ ۗ مَن ذَا الَّذِي يَشْفَعُ عِندَهُ إِلَّا بِإِذْنِهِ ۚ يَعْلَمُ مَا بَيْنَ أَيْدِيهِمْ وَمَا خَلْفَهُمْ ۖ وَلَا يُحِيطُونَ بِشَيْءٍ مِّنْ عِلْمِهِ إِلَّا بِمَا شَاءَ ۚ وَسِعَ كُرْسِيُّهُ السَّمَاوَاتِ وَالْأَرْضَ ۖ وَلَا يَئُودُهُ حِفْظُهُمَا ۚ وَهُوَ الْعَلِيُّ الْعَظِيمُ";

const AYAT_AL_KURSI_HEARD: &str = "الله لا اله الا هو الحي القيوم لا تاخذه سنه ولا نوم له ما في السماوات وما في الارض من ذا الذي يشفع عنده الا باذنه يعلم ما بين ايديهم وما خلفهم ولا يحيطون بشيء من علمه الا بما شاء وسع كرسيه السماوات والارض ولا يؤوده حفظهما وهو العلي العظيم";

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    group.bench_function("basmala", |b| {
        b.iter(|| normalize(black_box("بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ")))
    });

    group.bench_function("ayat_al_kursi", |b| {
        b.iter(|| normalize(black_box(AYAT_AL_KURSI)))
    });

    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    group.bench_function("exact", |b| {
        b.iter(|| score(black_box(AYAT_AL_KURSI), black_box(AYAT_AL_KURSI)))
    });

    group.bench_function("plain_transcript", |b| {
        b.iter(|| score(black_box(AYAT_AL_KURSI_HEARD), black_box(AYAT_AL_KURSI)))
    });

    group.bench_function("edit_distance_200x200", |b| {
        let reference: Vec<String> = (0..200).map(|i| format!("w{i}")).collect();
        let hypothesis: Vec<String> = (0..200).map(|i| format!("w{}", i * 7 % 200)).collect();
        b.iter(|| word_edit_distance(black_box(&reference), black_box(&hypothesis)))
    });

    group.finish();
}

fn bench_reward(c: &mut Criterion) {
    c.bench_function("calculate_xp_reward", |b| {
        b.iter(|| calculate_xp_reward(black_box(87.5), black_box(95)))
    });
}

criterion_group!(benches, bench_normalize, bench_score, bench_reward);
criterion_main!(benches);
