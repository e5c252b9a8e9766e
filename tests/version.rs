use resinfo::{constants::*, *};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();
fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::builder()
            .is_test(false)
            .filter_level(log::LevelFilter::Info)
            .format_timestamp(None)
            .format_module_path(false)
            .format_level(true)
            .format_target(false)
            .write_style(env_logger::WriteStyle::Auto)
            .init();
    });
}

const EN_US: Translation = Translation::new(0x0409, 0x04B0);
const DE_DE: Translation = Translation::new(0x0407, 0x04E4);

fn pad(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(0);
    }
}

fn utf16(value: &str) -> Vec<u8> {
    value.encode_utf16().chain([0]).flat_map(|unit| unit.to_le_bytes()).collect()
}

fn block(key: &str, type_: u16, value_length: u16, value: &[u8], children: &[Vec<u8>]) -> Vec<u8> {
    let mut data = vec![0u8; 6];
    data.extend(utf16(key));
    if !value.is_empty() {
        pad(&mut data);
        data.extend(value);
    }
    for child in children {
        pad(&mut data);
        data.extend(child);
    }
    let length = data.len() as u16;
    data[0..2].copy_from_slice(&length.to_le_bytes());
    data[2..4].copy_from_slice(&value_length.to_le_bytes());
    data[4..6].copy_from_slice(&type_.to_le_bytes());
    data
}

fn fixed_info(signature: u32, file_version: (u32, u32), product_version: (u32, u32)) -> Vec<u8> {
    [
        signature,
        0x00010000,
        file_version.0,
        file_version.1,
        product_version.0,
        product_version.1,
        VS_FFI_FILEFLAGSMASK,
        VS_FF_PRERELEASE,
        VOS_NT_WINDOWS32,
        VFT_DLL,
        VFT2_UNKNOWN,
        0,
        0,
    ]
    .iter()
    .flat_map(|value| value.to_le_bytes())
    .collect()
}

fn string_entry(key: &str, value: &str) -> Vec<u8> {
    let units = value.encode_utf16().count() as u16 + 1;
    block(key, 1, units, &utf16(value), &[])
}

fn string_table(key: &str, entries: &[Vec<u8>]) -> Vec<u8> { block(key, 1, 0, &[], entries) }

fn string_file_info(tables: &[Vec<u8>]) -> Vec<u8> { block("StringFileInfo", 1, 0, &[], tables) }

fn translation(value: &[u8]) -> Vec<u8> { block("Translation", 0, value.len() as u16, value, &[]) }

fn var_file_info(vars: &[Vec<u8>]) -> Vec<u8> { block("VarFileInfo", 1, 0, &[], vars) }

fn pairs(pairs: &[(u16, u16)]) -> Vec<u8> {
    pairs
        .iter()
        .flat_map(|(language, codepage)| {
            language.to_le_bytes().into_iter().chain(codepage.to_le_bytes())
        })
        .collect()
}

fn version_info(fixed: Option<&[u8]>, children: &[Vec<u8>]) -> Vec<u8> {
    match fixed {
        Some(fixed) => block("VS_VERSION_INFO", 0, fixed.len() as u16, fixed, children),
        None => block("VS_VERSION_INFO", 0, 0, &[], children),
    }
}

fn example() -> Vec<u8> {
    let fixed = fixed_info(VS_FIXEDFILEINFO_SIGNATURE, (0x00010002, 0x00030004), (0x00010000, 0));
    version_info(Some(&fixed), &[
        string_file_info(&[string_table("040904b0", &[
            string_entry("FileDescription", "Example"),
            string_entry("CompanyName", "Example Company"),
        ])]),
        var_file_info(&[translation(&pairs(&[(0x0409, 0x04B0)]))]),
    ])
}

#[test]
fn parse_version_info() {
    init_logger();

    let data = example();
    let info = VersionInfo::parse(&data).unwrap();

    let fixed = info.fixed().unwrap();
    assert_eq!(fixed.file_version_ms, 0x00010002);
    assert_eq!(fixed.file_version_ls, 0x00030004);
    assert_eq!(fixed.file_version(), [1, 2, 3, 4]);
    assert_eq!(fixed.product_version(), [1, 0, 0, 0]);
    assert_eq!(fixed.file_flags, VS_FF_PRERELEASE);
    assert!(fixed.has_flag(VS_FF_PRERELEASE));
    assert!(!fixed.has_flag(VS_FF_DEBUG));
    assert_eq!(fixed.file_os, VOS_NT_WINDOWS32);
    assert_eq!(fixed.file_type, VFT_DLL);
    assert_eq!(fixed.file_subtype, VFT2_UNKNOWN);
    assert_eq!(fixed.file_date(), 0);

    assert_eq!(info.translations(), &[EN_US]);
    assert!(info.unknown_blocks().is_empty());

    let query = info.query();
    assert_eq!(query.lookup(EN_US, VS_FILE_DESCRIPTION), Some("Example"));
    assert_eq!(query.lookup(EN_US, VS_COMPANY_NAME), Some("Example Company"));
    assert_eq!(query.lookup(EN_US, VS_PRODUCT_NAME), None);
    assert_eq!(query.lookup(DE_DE, VS_FILE_DESCRIPTION), None);
    assert_eq!(query.all_pairs(), vec![EN_US]);
    assert!(query.has_pair(EN_US));
    assert!(!query.has_pair(DE_DE));
    assert_eq!(query.strings(EN_US).collect::<Vec<_>>(), vec![
        ("FileDescription", "Example"),
        ("CompanyName", "Example Company")
    ]);
    assert_eq!(query.strings(DE_DE).count(), 0);
}

#[test]
fn parse_version_info_twice() {
    init_logger();

    let data = example();
    let first = VersionInfo::parse(&data).unwrap();
    let second = VersionInfo::parse(&data).unwrap();
    assert_eq!(first, second, "decoding is idempotent");
}

#[test]
fn parse_version_info_without_sections() {
    init_logger();

    let fixed = fixed_info(VS_FIXEDFILEINFO_SIGNATURE, (0x00010000, 0), (0x00010000, 0));
    let data = version_info(Some(&fixed), &[]);
    let info = VersionInfo::parse(&data).unwrap();
    assert!(info.fixed().is_some());
    assert!(info.translations().is_empty());
    assert_eq!(info.string_tables().count(), 0);
    assert!(info.query().all_pairs().is_empty());
}

#[test]
fn parse_version_info_without_fixed_info() {
    init_logger();

    let data = version_info(None, &[string_file_info(&[string_table("040904b0", &[
        string_entry("ProductName", "Example"),
    ])])]);
    let info = VersionInfo::parse(&data).unwrap();
    assert_eq!(info.fixed(), None, "missing fixed info is not an error");
    assert_eq!(info.query().lookup(EN_US, VS_PRODUCT_NAME), Some("Example"));
}

#[test]
fn parse_version_info_child_past_parent() {
    init_logger();

    let mut data = example();
    // header, key and padding (40 bytes) followed by the fixed info (52 bytes)
    let offset = 92;
    let key: Vec<u8> = utf16("StringFileInfo");
    assert_eq!(&data[offset + 6..offset + 6 + key.len()], &key[..], "string file info offset");

    let parent_remaining = data.len() - offset;
    data[offset..offset + 2].copy_from_slice(&(parent_remaining as u16 + 4).to_le_bytes());
    // trailing bytes past the root block must not extend the bound
    data.extend([0u8; 64]);

    let result = VersionInfo::parse(&data);
    assert!(matches!(result, Err(DecodeError::MalformedBlock(_))), "{:?}", result);
}

#[test]
fn parse_version_info_string_past_table() {
    init_logger();

    let mut table = string_table("040904b0", &[string_entry("Comments", "short")]);
    // first string entry starts after the table header, key and padding
    let offset = 6 + utf16("040904b0").len();
    let length = u16::from_le_bytes([table[offset], table[offset + 1]]);
    table[offset..offset + 2].copy_from_slice(&(length + 8).to_le_bytes());

    let data = version_info(None, &[
        string_file_info(&[table]),
        var_file_info(&[translation(&pairs(&[(0x0409, 0x04B0)]))]),
    ]);
    let result = VersionInfo::parse(&data);
    assert!(matches!(result, Err(DecodeError::MalformedBlock(_))), "{:?}", result);
}

#[test]
fn parse_version_info_zero_length_block() {
    init_logger();

    let data = version_info(None, &[vec![0u8; 8]]);
    let error = VersionInfo::parse(&data).unwrap_err();
    assert_eq!(error.kind(), DecodeErrorKind::MalformedBlock);
}

#[test]
fn parse_version_info_truncated() {
    init_logger();

    let data = example();
    for length in 0..data.len() {
        let result = VersionInfo::parse(&data[..length]);
        assert!(result.is_err(), "truncated to {} bytes: {:?}", length, result);
    }
    assert!(matches!(VersionInfo::parse(&data[..4]), Err(DecodeError::OutOfBounds(_))));
    assert!(matches!(VersionInfo::parse(&data[..64]), Err(DecodeError::MalformedBlock(_))));
}

#[test]
fn parse_version_info_invalid_header() {
    init_logger();

    let fixed = fixed_info(VS_FIXEDFILEINFO_SIGNATURE, (0, 0), (0, 0));
    let data = block("VS_VERSION_INFX", 0, fixed.len() as u16, &fixed, &[]);
    assert!(matches!(VersionInfo::parse(&data), Err(DecodeError::InvalidHeader(_))));

    let fixed = fixed_info(0x12345678, (0, 0), (0, 0));
    let data = version_info(Some(&fixed), &[]);
    assert!(matches!(VersionInfo::parse(&data), Err(DecodeError::InvalidHeader(_))));

    let fixed = fixed_info(VS_FIXEDFILEINFO_SIGNATURE, (0, 0), (0, 0));
    let data = version_info(Some(&fixed[..40]), &[]);
    assert!(matches!(VersionInfo::parse(&data), Err(DecodeError::InvalidHeader(_))));
}

#[test]
fn parse_version_info_unterminated_key() {
    init_logger();

    let mut data = vec![10, 0, 0, 0, 0, 0];
    data.extend("VS".encode_utf16().flat_map(|unit| unit.to_le_bytes()));
    assert_eq!(VersionInfo::parse(&data), Err(DecodeError::UnterminatedString(6)));
}

#[test]
fn parse_version_info_duplicate_strings() {
    init_logger();

    let data = version_info(None, &[string_file_info(&[string_table("040904b0", &[
        string_entry("FileDescription", "First"),
        string_entry("ProductName", "Product"),
        string_entry("FileDescription", "Second"),
    ])])]);
    let info = VersionInfo::parse(&data).unwrap();
    let query = info.query();
    assert_eq!(query.lookup(EN_US, VS_FILE_DESCRIPTION), Some("Second"), "last value wins");
    assert_eq!(query.strings(EN_US).count(), 2);
}

#[test]
fn parse_version_info_merges_tables() {
    init_logger();

    let data = version_info(None, &[
        string_file_info(&[string_table("040904b0", &[string_entry("FileDescription", "First")])]),
        string_file_info(&[
            string_table("040704e4", &[string_entry("FileDescription", "Erste")]),
            string_table("040904B0", &[
                string_entry("FileDescription", "Second"),
                string_entry("FileVersion", "1.2.3.4"),
            ]),
        ]),
    ]);
    let info = VersionInfo::parse(&data).unwrap();
    assert_eq!(info.string_tables().count(), 2, "tables of the same pair merged");

    let query = info.query();
    assert_eq!(query.lookup(EN_US, VS_FILE_DESCRIPTION), Some("Second"));
    assert_eq!(query.lookup(EN_US, VS_FILE_VERSION), Some("1.2.3.4"));
    assert_eq!(query.lookup(DE_DE, VS_FILE_DESCRIPTION), Some("Erste"));
    assert_eq!(query.all_pairs(), vec![EN_US, DE_DE], "string table order without translations");
    assert_eq!(query.lookup_any(VS_FILE_DESCRIPTION), Some((EN_US, "Second")));
}

#[test]
fn parse_version_info_translation_order() {
    init_logger();

    let data = version_info(None, &[
        string_file_info(&[
            string_table("040904b0", &[string_entry("FileDescription", "Example")]),
            string_table("040704e4", &[string_entry("FileDescription", "Beispiel")]),
        ]),
        var_file_info(&[translation(&pairs(&[(0x0407, 0x04E4), (0x0409, 0x04B0)]))]),
    ]);
    let info = VersionInfo::parse(&data).unwrap();
    let query = info.query();
    assert_eq!(query.all_pairs(), vec![DE_DE, EN_US], "translation table order");
    assert_eq!(query.lookup_any(VS_FILE_DESCRIPTION), Some((DE_DE, "Beispiel")));
}

#[test]
fn parse_version_info_translation_remainder() {
    init_logger();

    let mut value = pairs(&[(0x0409, 0x04B0)]);
    value.extend([0x07, 0x04]);
    let data = version_info(None, &[var_file_info(&[translation(&value)])]);
    let info = VersionInfo::parse(&data).unwrap();
    assert_eq!(info.translations(), &[EN_US], "remainder shorter than a pair ignored");
}

#[test]
fn parse_version_info_unknown_blocks() {
    init_logger();

    let unknown = block("CustomInfo", 0, 4, &[1, 2, 3, 4], &[]);
    let data = version_info(None, &[
        unknown.clone(),
        var_file_info(&[
            block("Other", 0, 0, &[], &[]),
            translation(&pairs(&[(0x0409, 0x04B0)])),
        ]),
    ]);
    let info = VersionInfo::parse(&data).unwrap();
    assert_eq!(info.translations(), &[EN_US], "known blocks after unknown blocks parsed");
    assert_eq!(info.unknown_blocks().len(), 1);
    assert_eq!(info.unknown_blocks()[0].key(), "CustomInfo");
    assert_eq!(info.unknown_blocks()[0].data(), &unknown[..]);
}

#[test]
fn parse_version_info_invalid_table_key() {
    init_logger();

    let data = version_info(None, &[string_file_info(&[string_table("0409", &[string_entry(
        "FileDescription",
        "Example",
    )])])]);
    assert!(matches!(VersionInfo::parse(&data), Err(DecodeError::MalformedBlock(_))));

    let data = version_info(None, &[string_file_info(&[string_table("0409g4b0", &[])])]);
    assert!(matches!(VersionInfo::parse(&data), Err(DecodeError::MalformedBlock(_))));
}

#[test]
fn parse_version_info_empty_values() {
    init_logger();

    let data = version_info(None, &[string_file_info(&[string_table("040904b0", &[
        block("Comments", 1, 0, &[], &[]),
        string_entry("PrivateBuild", ""),
        // value length counting bytes instead of units stays bounded by the block
        block("SpecialBuild", 1, 14, &utf16("Build"), &[]),
    ])])]);
    let info = VersionInfo::parse(&data).unwrap();
    let query = info.query();
    assert_eq!(query.lookup(EN_US, VS_COMMENTS), Some(""));
    assert_eq!(query.lookup(EN_US, VS_PRIVATE_BUILD), Some(""));
    assert_eq!(query.lookup(EN_US, VS_SPECIAL_BUILD), Some("Build"));
}

#[test]
fn parse_version_info_skips_binary_strings() {
    init_logger();

    let data = version_info(None, &[string_file_info(&[string_table("040904b0", &[
        string_entry("FileDescription", "Example"),
        block("Checksum", 0, 4, &[0xDE, 0xAD, 0xBE, 0xEF], &[]),
        string_entry("ProductName", "Product"),
    ])])]);
    let info = VersionInfo::parse(&data).unwrap();
    let query = info.query();
    assert_eq!(query.lookup(EN_US, "Checksum"), None, "binary string entry skipped");
    assert_eq!(query.lookup(EN_US, VS_FILE_DESCRIPTION), Some("Example"));
    assert_eq!(query.lookup(EN_US, VS_PRODUCT_NAME), Some("Product"), "entries after it decoded");
    assert_eq!(query.strings(EN_US).count(), 2);
}

#[test]
fn build_version_info_rejects_nul() {
    init_logger();

    let mut info = VersionInfo::default();
    info.set_string(EN_US, VS_COMMENTS, "a\0b");
    assert_eq!(info.build(), Err(EncodeError::InteriorNul("a\0b".to_string())));

    let mut info = VersionInfo::default();
    info.set_string(EN_US, "Com\0ments", "value");
    assert_eq!(info.build(), Err(EncodeError::InteriorNul("Com\0ments".to_string())));

    info.remove_strings(EN_US);
    info.set_string(EN_US, VS_COMMENTS, "value");
    let rebuilt = VersionInfo::parse(&info.build().unwrap()).unwrap();
    assert_eq!(info, rebuilt, "parsed and built version info equal");
}

#[test]
fn build_version_info() {
    init_logger();

    let data = example();
    let info = VersionInfo::parse(&data).unwrap();
    let built = info.build().unwrap();
    let rebuilt = VersionInfo::parse(&built).unwrap();
    assert_eq!(info, rebuilt, "parsed and built version info equal");
    assert_eq!(built.len(), data.len(), "built size equals original size");
}

#[test]
fn modify_version_info() {
    init_logger();

    let mut info = VersionInfo::default();
    let mut fixed = FixedVersionInfo::default();
    fixed.set_file_version([2, 5, 0, 17]);
    fixed.set_product_version([2, 5, 0, 0]);
    fixed.file_flags = VS_FF_DEBUG;
    info.set_fixed(Some(fixed));

    assert_eq!(info.set_string(EN_US, VS_FILE_DESCRIPTION, "Example"), None);
    assert_eq!(
        info.set_string(EN_US, VS_FILE_DESCRIPTION, "Changed"),
        Some("Example".to_string())
    );
    info.set_string(DE_DE, VS_FILE_DESCRIPTION, "Beispiel");
    info.set_string(DE_DE, VS_COMMENTS, "");
    assert_eq!(info.translations(), &[EN_US, DE_DE], "translations added");

    let built = info.build().unwrap();
    let rebuilt = VersionInfo::parse(&built).unwrap();
    assert_eq!(info, rebuilt, "parsed and built version info equal");

    let fixed = rebuilt.fixed().unwrap();
    assert_eq!(fixed.file_version(), [2, 5, 0, 17]);
    assert_eq!(fixed.product_version(), [2, 5, 0, 0]);
    assert!(fixed.has_flag(VS_FF_DEBUG));
    assert_eq!(rebuilt.query().lookup(EN_US, VS_FILE_DESCRIPTION), Some("Changed"));
    assert_eq!(rebuilt.query().lookup(DE_DE, VS_COMMENTS), Some(""));

    assert_eq!(info.remove_string(DE_DE, VS_COMMENTS), Some("".to_string()));
    assert_eq!(info.remove_string(DE_DE, VS_COMMENTS), None);
    assert_eq!(info.remove_string(DE_DE, VS_FILE_DESCRIPTION), Some("Beispiel".to_string()));
    assert_eq!(info.translations(), &[EN_US], "empty table and translation removed");
    assert!(info.string_table(DE_DE).is_none());

    assert!(info.remove_strings(EN_US).is_some());
    assert!(info.translations().is_empty());
    assert_eq!(info.query().lookup_any(VS_FILE_DESCRIPTION), None);
}

#[test]
fn build_version_info_too_large() {
    init_logger();

    let mut info = VersionInfo::default();
    info.set_string(EN_US, VS_COMMENTS, "x".repeat(40000));
    assert!(matches!(info.build(), Err(EncodeError::BlockTooLarge(..))));
}

#[test]
fn translation_keys() {
    init_logger();

    assert_eq!(Translation::from_key("040904b0"), Some(EN_US));
    assert_eq!(Translation::from_key("040904B0"), Some(EN_US));
    assert_eq!(Translation::from_key("+40904b0"), None);
    assert_eq!(Translation::from_key("040904b"), None);
    assert_eq!(Translation::from_key("040904b00"), None);
    assert_eq!(EN_US.key(), "040904b0");
    assert_eq!(DE_DE.to_string(), "040704e4");
    assert_eq!(Translation::new(LANGUAGE_ID_EN_US, CODE_PAGE_ID_EN_US), EN_US);
}
