//! End-to-end reconstruction from saved Tesseract TSV output.

use folio::core::config::LayoutConfig;
use folio::ocr::parse_tsv;
use folio::{FolioError, reconstruct_page, reconstruct_page_layout};

const LEASE_PAGE: &str = "\
level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t2480\t3508\t-1\t
2\t1\t1\t0\t0\t0\t100\t100\t300\t70\t-1\t
4\t1\t1\t1\t1\t0\t100\t100\t200\t30\t-1\t
5\t1\t1\t1\t1\t1\t170\t102\t90\t30\t93.1\ttenant
5\t1\t1\t1\t1\t2\t100\t100\t60\t30\t96.4\tThe
5\t1\t1\t1\t2\t1\t100\t140\t70\t30\t91.0\tshall
5\t1\t1\t1\t2\t2\t180\t140\t50\t30\t95.2\tpay
5\t1\t1\t1\t2\t3\t240\t140\t10\t30\t-1\t
5\t1\t2\t1\t1\t1\t100\t260\t70\t30\t94.0\tRent
5\t1\t2\t1\t1\t2\t180\t260\t30\t30\t92.7\tis
5\t1\t2\t1\t1\t3\t220\t260\t50\t30\t90.3\tdue
";

#[test]
fn test_tsv_page_to_paragraphs() {
    let records = parse_tsv(LEASE_PAGE).unwrap();
    assert_eq!(records.checked_len().unwrap(), 8);

    let page = reconstruct_page(1, &records, &LayoutConfig::default()).unwrap();
    let texts: Vec<_> = page.paragraphs.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["The tenant shall pay", "Rent is due"]);
    assert_eq!(page.to_text(), "The tenant shall pay\n\nRent is due");
}

#[test]
fn test_tsv_page_geometry() {
    let records = parse_tsv(LEASE_PAGE).unwrap();
    let layout = reconstruct_page_layout(1, &records, &LayoutConfig::default()).unwrap();

    assert_eq!(layout.paragraphs.len(), 2);
    let first = &layout.paragraphs[0];
    assert_eq!(first.lines().len(), 2);
    assert_eq!(first.bbox().y, 100);
    assert_eq!(first.bbox().bottom(), 170);

    for paragraph in &layout.paragraphs {
        for line in paragraph.lines() {
            assert!(paragraph.bbox().contains(&line.bbox()));
            for word in line.words() {
                assert!(line.bbox().contains(&word.bbox()));
            }
        }
    }
}

#[test]
fn test_confidence_threshold_from_config() {
    let records = parse_tsv(LEASE_PAGE).unwrap();
    let config = LayoutConfig {
        min_confidence: 93.0,
        ..Default::default()
    };

    let page = reconstruct_page(1, &records, &config).unwrap();
    let texts: Vec<_> = page.paragraphs.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["The tenant pay", "Rent"]);
}

#[test]
fn test_truncated_tsv_fails_the_page() {
    let truncated = "level\tpage_num\n5\t1\t1\t1\t1\t1\t100\n";
    let err = parse_tsv(truncated).unwrap_err();
    assert!(matches!(err, FolioError::MalformedInput { .. }));
}
