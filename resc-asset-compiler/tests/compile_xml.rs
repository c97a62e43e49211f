// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use resc_asset_compiler::{
    binary_xml_reader::{read_binary_xml, BinaryXmlDocument, BinaryXmlNode},
    compile_xml,
    resource_external_types::ResValueType,
    resource_internal_types::{ResourceId, ResourceName},
    xml_flattener::XmlFlattenerOptions,
    xml_linker::SymbolTable
};
use resc_common::*;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    xmlns:tools="http://schemas.android.com/tools"
    package="com.example"
    android:versionCode="12">
    <application android:label="@string/app_name" tools:ignore="AllowBackup">
        <activity android:name=".Main"/>
    </application>
</manifest>
"#;

fn symbols() -> SymbolTable {
    let mut table = SymbolTable::new("com.example");
    table.add(
        ResourceName::new("", "string", "app_name"),
        ResourceId(0x7f01_0000)
    );
    table
}

fn compile(text: &str, options: &XmlFlattenerOptions) -> BinaryXmlDocument {
    let mut diag = Diagnostics::new();
    let bytes = compile_xml(text.as_bytes(), "AndroidManifest.xml", &symbols(), options, &mut diag)
        .unwrap();
    assert_eq!(bytes.len() % 4, 0);
    read_binary_xml(&bytes).unwrap()
}

#[test]
fn manifest_compiles_and_reads_back() {
    let doc = compile(MANIFEST, &XmlFlattenerOptions::default());

    let names: Vec<&str> = doc.elements().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["manifest", "application", "activity"]);

    let (_, manifest) = doc.elements().next().unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest[0].name, "versionCode");
    assert_eq!(manifest[0].typed_value.data_type, ResValueType::IntDec);
    assert_eq!(manifest[0].typed_value.data, 12);
    assert_eq!(manifest[0].raw_value, None);
    // Unlinked attributes keep their text in both slots
    assert_eq!(manifest[1].name, "package");
    assert_eq!(manifest[1].resource_id, None);
    assert_eq!(manifest[1].raw_value.as_deref(), Some("com.example"));
    assert_eq!(manifest[1].string_value.as_deref(), Some("com.example"));

    let (_, application) = doc.elements().nth(1).unwrap();
    assert_eq!(application.len(), 1);
    assert_eq!(application[0].typed_value.data_type, ResValueType::Reference);
    assert_eq!(application[0].typed_value.data, 0x7f01_0000);

    let (_, activity) = doc.elements().nth(2).unwrap();
    assert_eq!(activity[0].string_value.as_deref(), Some(".Main"));
}

#[test]
fn attribute_names_with_ids_lead_the_pool() {
    let doc = compile(MANIFEST, &XmlFlattenerOptions::default());
    assert_eq!(doc.resource_map, vec![0x0101_0001, 0x0101_0003, 0x0101_021b]);
    assert_eq!(&doc.strings[..3], &["label", "name", "versionCode"]);
    let (_, manifest) = doc.elements().next().unwrap();
    assert_eq!(manifest[0].resource_id, Some(ResourceId(0x0101_021b)));
}

#[test]
fn tools_namespace_never_reaches_the_binary() {
    let doc = compile(MANIFEST, &XmlFlattenerOptions::default());
    assert!(!doc.strings.iter().any(|s| s == "http://schemas.android.com/tools"));
    let namespaces: Vec<&BinaryXmlNode> = doc
        .nodes
        .iter()
        .filter(|node| matches!(node, BinaryXmlNode::StartNamespace { .. }))
        .collect();
    assert_eq!(namespaces.len(), 1);
    assert!(matches!(
        namespaces[0],
        BinaryXmlNode::StartNamespace { prefix: Some(p), .. } if p == "android"
    ));
    assert!(matches!(doc.nodes.last(), Some(BinaryXmlNode::EndNamespace { .. })));
}

#[test]
fn raw_values_are_kept_on_request() {
    let options = XmlFlattenerOptions {
        keep_raw_values: true,
        use_utf16: true
    };
    let doc = compile(MANIFEST, &options);
    let (_, application) = doc.elements().nth(1).unwrap();
    assert_eq!(application[0].raw_value.as_deref(), Some("@string/app_name"));
}

// Text nodes keep one space on each side that had whitespace, which is what
// existing binary documents contain.
#[test]
fn text_node_whitespace_matches_legacy_output() {
    let doc = compile(
        "<resources><string>  hello   world\n</string><string>\n  </string></resources>",
        &XmlFlattenerOptions::default()
    );
    let texts: Vec<&str> = doc
        .nodes
        .iter()
        .filter_map(|node| match node {
            BinaryXmlNode::Cdata { text, .. } => Some(text.as_str()),
            _ => None
        })
        .collect();
    assert_eq!(texts, vec![" hello world "]);
}

#[test]
fn link_errors_stop_compilation() {
    let mut diag = Diagnostics::new();
    let result = compile_xml(
        r#"<a xmlns:android="http://schemas.android.com/apk/res/android" android:text="@string/gone"/>"#.as_bytes(),
        "res/layout/a.xml",
        &symbols(),
        &XmlFlattenerOptions::default(),
        &mut diag
    );
    assert!(matches!(result, Err(ResError::LinkFailed { errors: 1 })));
    assert!(diag.has_errors());
}

// Corrupted documents must be rejected, never read out of bounds.
#[test]
fn corrupted_documents_do_not_panic() {
    let mut diag = Diagnostics::new();
    let original = compile_xml(
        MANIFEST.as_bytes(),
        "AndroidManifest.xml",
        &symbols(),
        &XmlFlattenerOptions::default(),
        &mut diag
    )
    .unwrap();

    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    for _ in 0..2000 {
        let mut bytes = original.clone();
        for _ in 0..(next() % 8 + 1) {
            let at = (next() % bytes.len() as u64) as usize;
            bytes[at] = next() as u8;
        }
        if next() % 4 == 0 {
            let len = (next() % bytes.len() as u64) as usize;
            bytes.truncate(len);
        }
        let _ = read_binary_xml(&bytes);
    }
}
