//! Box search tests

mod helpers;

use bk_core::{
	domain::{BoxSearch, BoxUpdate, LocationFilter, NewBox},
	ErrorCode,
};
use helpers::TestInventory;

async fn seeded() -> (TestInventory, uuid::Uuid) {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();
	let garage = t
		.service
		.create_location(&t.owner, ws, None, "Garage")
		.await
		.unwrap();

	let boxes = [
		NewBox::named("Camping stove")
			.in_location(garage.id)
			.with_tags(["Outdoor", "kitchen"]),
		NewBox {
			description: Some("Sleeping bags and a TENT".to_string()),
			..NewBox::named("Camping soft goods").in_location(garage.id)
		},
		NewBox::named("Christmas lights").with_tags(["seasonal"]),
		NewBox::named("100% cotton sheets"),
	];
	for new in boxes {
		t.service.create_box(&t.owner, ws, new).await.unwrap();
	}

	(t, garage.id)
}

fn query(text: &str) -> BoxSearch {
	BoxSearch {
		query: Some(text.to_string()),
		..Default::default()
	}
}

#[tokio::test]
async fn matches_name_description_and_tags_case_insensitively() {
	let (t, _) = seeded().await;
	let ws = t.workspace_id();

	let by_name = t.service.search_boxes(&t.owner, ws, &query("CAMPING")).await.unwrap();
	assert_eq!(by_name.total_items, 2);

	let by_description = t.service.search_boxes(&t.owner, ws, &query("tent")).await.unwrap();
	assert_eq!(by_description.items.len(), 1);
	assert_eq!(by_description.items[0].name, "Camping soft goods");

	let by_tag = t.service.search_boxes(&t.owner, ws, &query("outdoor")).await.unwrap();
	assert_eq!(by_tag.items.len(), 1);
	assert_eq!(by_tag.items[0].tags, vec!["outdoor", "kitchen"]);

	let literal_percent = t.service.search_boxes(&t.owner, ws, &query("100%")).await.unwrap();
	assert_eq!(literal_percent.total_items, 1);
}

#[tokio::test]
async fn matches_short_codes() {
	let (t, _) = seeded().await;
	let ws = t.workspace_id();
	let all = t
		.service
		.search_boxes(&t.owner, ws, &BoxSearch::default())
		.await
		.unwrap();
	let target = &all.items[0];

	let found = t
		.service
		.search_boxes(&t.owner, ws, &query(&target.short_code))
		.await
		.unwrap();
	assert!(found.items.iter().any(|b| b.id == target.id));
}

#[tokio::test]
async fn location_filter_narrows_results() {
	let (t, garage) = seeded().await;
	let ws = t.workspace_id();

	let at_garage = t
		.service
		.search_boxes(
			&t.owner,
			ws,
			&BoxSearch {
				location: LocationFilter::At(garage),
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(at_garage.total_items, 2);

	let unassigned = t
		.service
		.search_boxes(
			&t.owner,
			ws,
			&BoxSearch {
				location: LocationFilter::Unassigned,
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(unassigned.total_items, 2);
	assert!(unassigned.items.iter().all(|b| b.location_id.is_none()));
}

#[tokio::test]
async fn results_are_paged_by_name() {
	let (t, _) = seeded().await;
	let ws = t.workspace_id();

	let first = t
		.service
		.search_boxes(
			&t.owner,
			ws,
			&BoxSearch {
				page: 1,
				page_size: Some(3),
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(first.items.len(), 3);
	assert_eq!(first.total_items, 4);
	assert_eq!(first.total_pages(), 2);
	assert_eq!(first.items[0].name, "100% cotton sheets");

	let second = t
		.service
		.search_boxes(
			&t.owner,
			ws,
			&BoxSearch {
				page: 2,
				page_size: Some(3),
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(second.items.len(), 1);
	assert_eq!(second.items[0].name, "Christmas lights");
}

#[tokio::test]
async fn oversized_input_is_rejected_before_writing() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let err = t
		.service
		.create_box(&t.owner, ws, NewBox::named("x".repeat(101)))
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::InvalidInput);

	let err = t
		.service
		.create_box(
			&t.owner,
			ws,
			NewBox::named("Tags").with_tags((0..21).map(|i| format!("t{i}"))),
		)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::InvalidInput);

	let page = t
		.service
		.search_boxes(&t.owner, ws, &BoxSearch::default())
		.await
		.unwrap();
	assert_eq!(page.total_items, 0);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
	let (t, _) = seeded().await;
	let ws = t.workspace_id();

	for page in [3, u64::MAX] {
		let result = t
			.service
			.search_boxes(
				&t.owner,
				ws,
				&BoxSearch {
					page,
					page_size: Some(2),
					..Default::default()
				},
			)
			.await
			.unwrap();
		assert!(result.items.is_empty());
		assert_eq!(result.page, page);
		assert_eq!(result.total_items, 4);
	}
}

#[tokio::test]
async fn tag_matches_stay_within_a_single_tag() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();
	t.service
		.create_box(&t.owner, ws, NewBox::named("Plain"))
		.await
		.unwrap();
	t.service
		.create_box(&t.owner, ws, NewBox::named("Tagged").with_tags(["io", "01"]))
		.await
		.unwrap();

	for text in ["[", "]", "\"", ",", "o\",\"0"] {
		let result = t.service.search_boxes(&t.owner, ws, &query(text)).await.unwrap();
		assert_eq!(result.total_items, 0, "query {text:?} matched JSON syntax");
	}

	let inside_tag = t.service.search_boxes(&t.owner, ws, &query("O")).await.unwrap();
	assert_eq!(inside_tag.items.len(), 1);
	assert_eq!(inside_tag.items[0].name, "Tagged");
}

#[tokio::test]
async fn non_ascii_text_matches_regardless_of_case() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();
	let created = t
		.service
		.create_box(
			&t.owner,
			ws,
			NewBox {
				description: Some("Größe XL".to_string()),
				..NewBox::named("Über-Kiste").with_tags(["Äpfel"])
			},
		)
		.await
		.unwrap();

	for text in ["über", "ÜBER-KISTE", "größe", "äpfel", "ÄPFEL"] {
		let result = t.service.search_boxes(&t.owner, ws, &query(text)).await.unwrap();
		assert_eq!(result.total_items, 1, "query {text:?}");
	}

	t.service
		.rename_or_retag(
			&t.owner,
			ws,
			created.id,
			BoxUpdate {
				name: Some("Ölkanister".to_string()),
				..Default::default()
			},
		)
		.await
		.unwrap();
	let renamed = t.service.search_boxes(&t.owner, ws, &query("ölkan")).await.unwrap();
	assert_eq!(renamed.total_items, 1);
	let stale = t.service.search_boxes(&t.owner, ws, &query("über")).await.unwrap();
	assert_eq!(stale.total_items, 0);
}

#[tokio::test]
async fn location_filter_requires_a_live_location_in_the_workspace() {
	let (t, garage) = seeded().await;
	let ws = t.workspace_id();
	let at = |location_id| BoxSearch {
		location: LocationFilter::At(location_id),
		..Default::default()
	};

	let other = t.service.create_workspace(&t.owner, "Cabin").await.unwrap();
	let shed = t
		.service
		.create_location(&t.owner, other.id, None, "Shed")
		.await
		.unwrap();
	let err = t.service.search_boxes(&t.owner, ws, &at(shed.id)).await.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);

	t.service
		.soft_delete_location(&t.owner, ws, garage)
		.await
		.unwrap();
	let err = t.service.search_boxes(&t.owner, ws, &at(garage)).await.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);
}
