
use test_utils::{library_of, schematic_of};

const RESISTOR_LIB: &str = r#"
(kicad_symbol_lib (version 20200629) (generator kicad_symbol_editor)
  (symbol "R" (pin_names (offset 0)) (in_bom yes) (on_board yes)
    (property "Reference" "R1" (id 0) (at 2.54 0 0))
    (property "Value" "10k" (id 1) (at 2.54 -2.54 0))
    (property "Footprint" "" (id 2) (at 0 0 0))
    (property "Datasheet" "~" (id 3) (at 0 0 0))
    (symbol "R_0_1"
      (rectangle (start -1.016 3.81) (end 1.016 -3.81)
        (stroke (width 0.254)) (fill (type none))))
    (symbol "R_1_1"
      (pin passive line (at 0 5.08 270) (length 1.27)
        (name "~" (effects (font (size 1.27 1.27))))
        (number "1" (effects (font (size 1.27 1.27))))))))
"#;

const RESISTOR_LIB_EXPECTED: &str = "\
EESchema-LIBRARY Version 2.4
#encoding utf-8
#
# R
#
DEF R R1 0 0 Y Y 1 F N
F0 \"R1\" 100 0 50 H V C CNN
F1 \"10k\" 100 -100 50 H V C CNN
F2 \"\" 0 0 50 H V C CNN
F3 \"\" 0 0 50 H V C CNN
DRAW
S -40 150 40 -150 0 1 10 N
X ~ 1 0 200 50 D 50 50 1 1 P
ENDDRAW
ENDDEF
#
#End Library
";

#[test]
fn resistor_library_end_to_end() {
    let library = library_of(RESISTOR_LIB);
    let text = library.to_legacy_lib(false).unwrap();
    assert_eq!(text, RESISTOR_LIB_EXPECTED);
}

#[test]
fn emission_is_deterministic() {
    let first = library_of(RESISTOR_LIB).to_legacy_lib(false).unwrap();
    let second = library_of(RESISTOR_LIB).to_legacy_lib(false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn draw_block_orders_rectangles_before_pins() {
    let text = library_of(RESISTOR_LIB).to_legacy_lib(false).unwrap();
    let draw_pos = text.find("DRAW").unwrap();
    let rect_pos = text.find("\nS ").unwrap();
    let pin_pos = text.find("\nX ").unwrap();
    let end_pos = text.find("ENDDRAW").unwrap();
    assert!(draw_pos < rect_pos && rect_pos < pin_pos && pin_pos < end_pos);
}

#[test]
fn cache_library_prefixes_symbol_names() {
    let library = library_of(&RESISTOR_LIB.replace("(symbol \"R\"", "(symbol \"Device:R\""));
    let plain = library.to_legacy_lib(false).unwrap();
    let cache = library.to_legacy_lib(true).unwrap();
    assert!(plain.contains("DEF R R1 0 0 Y Y 1 F N"));
    assert!(cache.contains("DEF Device_R R1 0 0 Y Y 1 F N"));
    // the prefix is the only difference between the two DEF headers
    assert_eq!(plain.replace("# R\n", "# Device_R\n").replace("DEF R ", "DEF Device_R "), cache);
}

const ALIAS_LIB: &str = r#"
(kicad_symbol_lib
  (symbol "R"
    (property "Reference" "R" (id 0) (at 0 0 0))
    (property "Value" "R" (id 1) (at 0 0 0))
    (property "Footprint" "" (id 2) (at 0 0 0))
    (property "Datasheet" "" (id 3) (at 0 0 0)))
  (symbol "R_Small" (extends "R")
    (property "Reference" "R" (id 0) (at 0 0 0))
    (property "Value" "R_Small" (id 1) (at 0 0 0))
    (property "Footprint" "" (id 2) (at 0 0 0))
    (property "Datasheet" "" (id 3) (at 0 0 0))
    (property "ki_keywords" "resistor small" (id 4) (at 0 0 0))))
"#;

#[test]
fn extends_becomes_alias_of_base() {
    let library = library_of(ALIAS_LIB);
    let text = library.to_legacy_lib(false).unwrap();
    // the alias itself gets no DEF block
    assert!(!text.contains("DEF R_Small"));
    assert_eq!(text.matches("DEF ").count(), 1);
    assert_eq!(text.matches("ALIAS R_Small").count(), 1);
    assert!(text.contains("F3 \"\" 0 0 50 H V C CNN\nALIAS R_Small\nDRAW"));
}

#[test]
fn doc_library_includes_aliases_in_declaration_order() {
    let library = library_of(ALIAS_LIB);
    let dcm = library.to_legacy_dcm();
    // only the alias carries keywords, so only it gets a block
    assert_eq!(
        dcm,
        "EESchema-DOCLIB  Version 2.0\n#\n$CMP R_Small\nK resistor small\n$ENDCMP\n#\n#End Doc Library\n"
    );
}

#[test]
fn doc_library_filters_undocumented_symbols() {
    let library = library_of(RESISTOR_LIB);
    // "~" datasheet text still counts as text; clear it to test the filter
    let empty = library_of(&RESISTOR_LIB.replace("\"~\"", "\"\""));
    assert!(!empty.to_legacy_dcm().contains("$CMP"));
    assert!(library.to_legacy_dcm().contains("$CMP R"));
}

#[test]
fn keywords_only_symbol_emits_exactly_a_k_line() {
    let library = library_of(
        r#"(kicad_symbol_lib
             (symbol "C"
               (property "Reference" "C" (id 0) (at 0 0 0))
               (property "Value" "C" (id 1) (at 0 0 0))
               (property "Footprint" "" (id 2) (at 0 0 0))
               (property "Datasheet" "" (id 3) (at 0 0 0))
               (property "ki_keywords" "cap capacitor" (id 4) (at 0 0 0))))"#,
    );
    let dcm = library.to_legacy_dcm();
    assert!(dcm.contains("$CMP C\nK cap capacitor\n$ENDCMP"));
    assert!(!dcm.contains("\nD "));
    assert!(!dcm.contains("\nF "));
}

#[test]
fn fp_filter_block_and_description() {
    let library = library_of(
        r#"(kicad_symbol_lib
             (symbol "L"
               (property "Reference" "L" (id 0) (at 0 0 0))
               (property "Value" "L" (id 1) (at 0 0 0))
               (property "Footprint" "" (id 2) (at 0 0 0))
               (property "Datasheet" "" (id 3) (at 0 0 0))
               (property "ki_description" "Inductor" (id 4) (at 0 0 0))
               (property "ki_fp_filters" "Choke_* L_*" (id 5) (at 0 0 0))))"#,
    );
    let lib = library.to_legacy_lib(false).unwrap();
    assert!(lib.contains("$FPLIST\n Choke_* L_*\n$ENDFPLIST\nDRAW"));
    let dcm = library.to_legacy_dcm();
    assert!(dcm.contains("$CMP L\nD Inductor\n$ENDCMP"));
}

const SHEET: &str = r#"
(kicad_sch (version 20200629) (generator eeschema)
  (lib_symbols
    (symbol "Device:R" (pin_names (offset 0))
      (property "Reference" "R" (id 0) (at 2.54 0 0))
      (property "Value" "R" (id 1) (at 2.54 -2.54 0))
      (property "Footprint" "" (id 2) (at 0 0 0))
      (property "Datasheet" "~" (id 3) (at 0 0 0))
      (symbol "R_0_1"
        (rectangle (start -1.016 3.81) (end 1.016 -3.81)
          (stroke (width 0.254)) (fill (type none))))))
  (junction (at 63.5 82.55) (diameter 0) (color 0 0 0 0))
  (no_connect (at 25.4 25.4))
  (wire (pts (xy 63.5 82.55) (xy 76.2 82.55)))
  (label "VCC" (at 50.8 25.4 0) (effects (font (size 1.27 1.27))))
  (symbol (lib_id "Device:R") (at 63.5 82.55 0) (unit 1)
    (in_bom yes) (on_board yes)
    (uuid 9cf01f3c-7e4e-466e-9fbb-0c3bcb1e55b4)
    (property "Reference" "R1" (id 0) (at 66.04 82.55 0))
    (property "Value" "10k" (id 1) (at 63.5 85.09 0))
    (property "Footprint" "" (id 2) (at 0 0 0))
    (property "Datasheet" "~" (id 3) (at 0 0 0))
    (property "MPN" "RC0603" (id 4) (at 63.5 82.55 0))))
"#;

const SHEET_EXPECTED: &str = "\
EESchema Schematic File Version 4
EELAYER 30 0
EELAYER END
$Descr A4 11693 8268
encoding utf-8
Sheet 1 1
Title \"\"
Date \"\"
Rev \"\"
Comp \"\"
Comment1 \"\"
Comment2 \"\"
Comment3 \"\"
Comment4 \"\"
$EndDescr
Connection ~ 2500 3250
NoConn ~ 1000 1000
Wire Wire Line
\t2500 3250 3000 3250
Text Label 2000 1000 0    50   ~ 0
VCC
$Comp
L Device:R R1
U 1 1 1000
P 2500 3250
F 0 \"R1\" H 2600 3250 50  0000 C CNN
F 1 \"10k\" H 2500 3150 50  0000 C CNN
F 2 \"\" H 0 6500 50  0000 C CNN
F 3 \"~\" H 0 6500 50  0000 C CNN
F 4 \"RC0603\" H 2500 3250 50  0000 C CNN \"MPN\"
\t1    2500 3250
\t1    0    0    -1
$EndComp
$EndSCHEMATC
";

#[test]
fn schematic_end_to_end() {
    let (sheet, _) = schematic_of(SHEET, 0x1000);
    assert_eq!(sheet.to_legacy_sch().unwrap(), SHEET_EXPECTED);
}

#[test]
fn schematic_cache_library_uses_prefixed_names() {
    let (_, cache) = schematic_of(SHEET, 0x1000);
    let text = cache.to_legacy_lib(true).unwrap();
    assert!(text.contains("DEF Device_R R 0 0 Y Y 1 F N"));
    assert!(text.contains("S -40 150 40 -150 0 1 10 N"));
}

#[test]
fn unknown_sheet_keywords_are_skipped() {
    let (sheet, _) = schematic_of(
        r#"(kicad_sch (lib_symbols)
             (sheet_instances (path "/" (page "1")))
             (polyline (pts (xy 0 0) (xy 1 1))))"#,
        1,
    );
    assert!(sheet.symbols.is_empty());
    assert!(sheet.wires.is_empty());
}
