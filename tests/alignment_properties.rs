use std::path::PathBuf;

use strand::aligner::{AlignmentBead, GridAligner, LengthAligner, MoveTable};
use strand::io::{load_sentences, read_lines};
use strand::text::{align_sentences, parse_stream, BitextExtractor, StrandAligner};

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn length_pairs() -> Vec<(Vec<usize>, Vec<usize>)> {
    vec![
        (vec![12, 40, 7, 33, 18, 90, 5, 26], vec![14, 22, 19, 8, 35, 20, 85, 30]),
        (vec![10, 31, 12, 50, 9, 44], vec![11, 40, 48, 3, 10, 41, 7]),
        (vec![30, 20, 25, 40], vec![30, 45, 40]),
        (vec![1, 1, 1], vec![1, 1, 1]),
        (vec![0, 5, 0], vec![5]),
        (vec![1], vec![1000]),
    ]
}

fn token_pairs() -> Vec<(Vec<u32>, Vec<u32>)> {
    vec![
        (vec![1, 2, 3, 4, 5], vec![1, 3, 4, 6, 5, 5]),
        (vec![7, 7, 7], vec![7]),
        (vec![2], vec![3, 4, 5, 2]),
        (vec![9, 8, 7, 6], vec![6, 7, 8, 9]),
    ]
}

fn assert_partition(beads: &[AlignmentBead], source_len: usize, target_len: usize) {
    let (mut s, mut t) = (0, 0);
    for bead in beads {
        assert_eq!(bead.source.start, s);
        assert_eq!(bead.target.start, t);
        assert!(bead.source_units() + bead.target_units() > 0);

        s = bead.source.end;
        t = bead.target.end;
    }

    assert_eq!((s, t), (source_len, target_len));
}

#[test]
fn test_grid_alignment_covers_both_sequences() {
    let aligner = GridAligner::new();

    for (source, target) in token_pairs() {
        let result = aligner.align(&source, &target).unwrap();

        let source_ix: Vec<_> = result.alignment.iter().filter_map(|p| p.source).collect();
        let target_ix: Vec<_> = result.alignment.iter().filter_map(|p| p.target).collect();

        assert_eq!(source_ix, (0..source.len()).collect::<Vec<_>>());
        assert_eq!(target_ix, (0..target.len()).collect::<Vec<_>>());
    }
}

#[test]
fn test_grid_identity() {
    let aligner = GridAligner::new();

    for (source, _) in token_pairs() {
        let result = aligner.align(&source, &source).unwrap();

        assert_eq!(result.score, 0);
        assert_eq!(result.num_aligned(), source.len());
        assert!(result.alignment.iter().enumerate().all(|(i, p)| p.as_signed() == (i as isize, i as isize)));
    }
}

#[test]
fn test_grid_empty_sequences() {
    let aligner = GridAligner::new();

    let result = aligner.align::<u32>(&[], &[]).unwrap();
    assert_eq!(result.score, 0);
    assert!(result.alignment.is_empty());

    let result = aligner.align::<u32>(&[], &[5]).unwrap();
    assert_eq!(result.score, -1);
    assert_eq!(result.alignment.iter().map(|p| p.as_signed()).collect::<Vec<_>>(), vec![(-1, 0)]);
}

#[test]
fn test_length_beads_partition_and_score() {
    let aligner = LengthAligner::gale_church();

    for (source, target) in length_pairs() {
        let result = aligner.align(&source, &target).unwrap();
        assert_partition(&result.beads, source.len(), target.len());

        let recomputed = aligner.score_beads(&result.beads, &source, &target).unwrap();
        assert!((recomputed - result.score).abs() <= 1e-9 * result.score.abs().max(1.0));
        assert!(result.score.is_finite());
    }
}

#[test]
fn test_length_symmetry() {
    let aligner = LengthAligner::gale_church();
    let mirrored = LengthAligner::new(MoveTable::gale_church().mirrored(), *aligner.cost_model());

    for (source, target) in length_pairs() {
        let forward = aligner.align(&source, &target).unwrap();
        let backward = mirrored.align(&target, &source).unwrap();

        let mirrored_beads: Vec<_> = forward.beads.iter().map(AlignmentBead::mirrored).collect();
        assert_eq!(backward.beads, mirrored_beads);
        assert!((forward.score - backward.score).abs() <= 1e-9 * forward.score.abs().max(1.0));
    }
}

#[test]
fn test_length_empty_sequences() {
    let result = LengthAligner::gale_church().align(&[], &[]).unwrap();
    assert_eq!(result.score, 0.0);
    assert!(result.beads.is_empty());
}

#[test]
fn test_sentence_files() {
    let source = load_sentences(data_path("minutes.en.txt")).unwrap();
    let target = load_sentences(data_path("minutes.fr.txt")).unwrap();

    let aln = align_sentences(&LengthAligner::gale_church(), &source, &target).unwrap();

    let beads: Vec<_> = aln.pairs.iter().map(|p| p.bead.clone()).collect();
    assert_eq!(beads, vec![
        AlignmentBead::new(0..1, 0..1),
        AlignmentBead::new(1..2, 1..3),
        AlignmentBead::new(2..3, 3..4),
    ]);

    assert_eq!(aln.pairs[1].target, "Il a discuté du budget de l'année prochaine. Il l'a approuvé.");
    assert!((aln.score + 4.095246434022477).abs() < 1e-6);
}

#[test]
fn test_markup_documents() {
    let source_lines = read_lines(std::fs::read(data_path("page.en.txt")).unwrap().as_slice()).unwrap();
    let target_lines = read_lines(std::fs::read(data_path("page.fr.txt")).unwrap().as_slice()).unwrap();

    let source = parse_stream(&source_lines);
    let target = parse_stream(&target_lines);
    assert_eq!((source.len(), target.len()), (8, 10));

    let aln = StrandAligner::new().align(&source, &target).unwrap();

    // The wrapping div is the only structural difference
    let unmatched: Vec<_> = aln.pairs.iter()
        .filter(|(s, _)| s.is_none())
        .filter_map(|(_, t)| t.map(|v| v.to_string()))
        .collect();
    assert_eq!(unmatched, vec!["[START:div]", "[END:div]"]);

    assert!((aln.features.difference_percentage - 2.0 / 18.0).abs() < 1e-12);
    assert_eq!(aln.features.aligned_chunks, 2);
    assert!((aln.features.chunk_length_correlation - 1.0).abs() < 1e-12);
}

#[test]
fn test_bitext_from_markup_documents() {
    let source = parse_stream(read_lines(std::fs::read(data_path("page.en.txt")).unwrap().as_slice()).unwrap());
    let target = parse_stream(read_lines(std::fs::read(data_path("page.fr.txt")).unwrap().as_slice()).unwrap());

    let bitext = BitextExtractor::new().extract(&source, &target).unwrap();

    assert!((bitext.difference_percentage - 2.0 / 18.0).abs() < 1e-12);

    let pairs: Vec<_> = bitext.pairs.iter()
        .map(|p| (p.source_pos, p.target_pos, p.source.as_str(), p.target.as_str()))
        .collect();
    assert_eq!(pairs, vec![
        (2, 2, "Minutes", "Procès-verbal"),
        (5, 6, "The committee met on Monday.", "Le comité s'est réuni lundi."),
    ]);

    let scores: Vec<_> = bitext.pairs.iter().map(|p| p.score.unwrap()).collect();
    assert!((scores[0] + 0.8782722096065626).abs() < 1e-6);
    assert!((scores[1] + 0.11653376817924693).abs() < 1e-6);
}
