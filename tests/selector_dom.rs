//! DOM round-trip for the selector escaping rule: an element tagged
//! with a raw document name must be found again through the escaped
//! selector. Runs under wasm-bindgen-test in a browser.

#![cfg(target_arch = "wasm32")]

use traceability_canvas::linkage::escape::class_selector;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn escaped_selector_matches_the_tagged_element() {
	let document = web_sys::window().unwrap().document().unwrap();
	let body = document.body().unwrap();

	let element = document.create_element("div").unwrap();
	element.set_class_name("trace-node A/B:1");
	body.append_child(&element).unwrap();

	let found = document
		.query_selector(&format!(".trace-node{}", class_selector("A/B:1")))
		.unwrap()
		.expect("selector should match the tagged element");
	assert!(found.is_same_node(Some(&element)));

	body.remove_child(&element).unwrap();
}

#[wasm_bindgen_test]
fn unescaped_special_characters_do_not_match() {
	let document = web_sys::window().unwrap().document().unwrap();
	assert!(document.query_selector(".A/B:1").is_err());
}
