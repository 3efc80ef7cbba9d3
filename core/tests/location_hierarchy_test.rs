//! Location hierarchy tests
//!
//! Depth limits, sibling uniqueness, soft delete with box unassignment.

mod helpers;

use bk_core::{
	domain::{NewBox, MAX_LOCATION_DEPTH},
	ErrorCode, InventoryError,
};
use helpers::TestInventory;
use tracing_test::traced_test;
use uuid::Uuid;

#[tokio::test]
async fn garage_and_shelf_then_too_deep() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let garage = t
		.service
		.create_location(&t.owner, ws, None, "Garage")
		.await
		.unwrap();
	let shelf = t
		.service
		.create_location(&t.owner, ws, Some(garage.id), "Shelf-A")
		.await
		.unwrap();
	assert_eq!(shelf.depth(), 2);
	assert_eq!(shelf.parent_id, Some(garage.id));

	let mut parent = shelf.id;
	for level in 3..=MAX_LOCATION_DEPTH {
		let created = t
			.service
			.create_location(&t.owner, ws, Some(parent), &format!("Level {level}"))
			.await
			.unwrap();
		assert!(created.depth() <= MAX_LOCATION_DEPTH);
		parent = created.id;
	}

	let err = t
		.service
		.create_location(&t.owner, ws, Some(parent), "Level 6")
		.await
		.unwrap_err();
	assert!(matches!(err, InventoryError::MaxDepthExceeded { max: 5 }));
	assert_eq!(err.code(), ErrorCode::MaxDepthExceeded);
}

#[tokio::test]
async fn siblings_need_distinct_names_but_cousins_do_not() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let garage = t
		.service
		.create_location(&t.owner, ws, None, "Garage")
		.await
		.unwrap();
	let attic = t
		.service
		.create_location(&t.owner, ws, None, "Attic")
		.await
		.unwrap();
	t.service
		.create_location(&t.owner, ws, Some(garage.id), "Shelf")
		.await
		.unwrap();
	t.service
		.create_location(&t.owner, ws, Some(attic.id), "Shelf")
		.await
		.unwrap();

	let err = t
		.service
		.create_location(&t.owner, ws, Some(garage.id), "  Shelf ")
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::DuplicateSiblingName);
}

#[tokio::test]
async fn concurrent_creates_with_same_name_leave_one_winner() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let (a, b) = tokio::join!(
		t.service.create_location(&t.owner, ws, None, "Basement"),
		t.service.create_location(&t.owner, ws, None, "Basement"),
	);

	let outcomes = [a, b];
	let winners = outcomes.iter().filter(|r| r.is_ok()).count();
	assert_eq!(winners, 1);
	assert!(outcomes.iter().any(|r| matches!(
		r,
		Err(InventoryError::DuplicateSiblingName { .. })
	)));

	let roots = t.service.list_locations(&t.owner, ws, None).await.unwrap();
	assert_eq!(roots.len(), 1);
}

#[tokio::test]
async fn rename_keeps_position_and_checks_siblings() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let garage = t
		.service
		.create_location(&t.owner, ws, None, "Garage")
		.await
		.unwrap();
	t.service
		.create_location(&t.owner, ws, None, "Attic")
		.await
		.unwrap();
	let shelf = t
		.service
		.create_location(&t.owner, ws, Some(garage.id), "Shelf")
		.await
		.unwrap();

	let err = t
		.service
		.rename_location(&t.owner, ws, garage.id, "Attic")
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::DuplicateSiblingName);

	let renamed = t
		.service
		.rename_location(&t.owner, ws, garage.id, "Workshop")
		.await
		.unwrap();
	assert_eq!(renamed.name, "Workshop");
	assert_eq!(renamed.path, garage.path);

	let details = t
		.service
		.get_location(&t.owner, ws, shelf.id)
		.await
		.unwrap();
	assert_eq!(details.location.path, shelf.path);
	assert_eq!(details.breadcrumbs[0].name, "Workshop");
}

#[tokio::test]
#[traced_test]
async fn attic_delete_unassigns_its_boxes() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let attic = t
		.service
		.create_location(&t.owner, ws, None, "Attic")
		.await
		.unwrap();
	let b1 = t
		.service
		.create_box(&t.owner, ws, NewBox::named("B1").in_location(attic.id))
		.await
		.unwrap();
	assert_eq!(b1.location_id, Some(attic.id));

	t.service
		.soft_delete_location(&t.owner, ws, attic.id)
		.await
		.unwrap();

	let details = t.service.get_box(&t.owner, ws, b1.id).await.unwrap();
	assert_eq!(details.storage_box.location_id, None);
	assert!(details.location.is_none());

	let roots = t.service.list_locations(&t.owner, ws, None).await.unwrap();
	assert!(roots.iter().all(|l| l.id != attic.id));

	assert!(logs_contain("Soft-deleted location"));
}

#[tokio::test]
async fn soft_delete_twice_reports_not_found_without_changing_state() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let attic = t
		.service
		.create_location(&t.owner, ws, None, "Attic")
		.await
		.unwrap();
	let keep = t
		.service
		.create_location(&t.owner, ws, None, "Cellar")
		.await
		.unwrap();

	t.service
		.soft_delete_location(&t.owner, ws, attic.id)
		.await
		.unwrap();
	let after_first = t.service.list_locations(&t.owner, ws, None).await.unwrap();

	let err = t
		.service
		.soft_delete_location(&t.owner, ws, attic.id)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);

	let after_second = t.service.list_locations(&t.owner, ws, None).await.unwrap();
	assert_eq!(after_first, after_second);
	assert_eq!(after_second.len(), 1);
	assert_eq!(after_second[0].id, keep.id);

	let err = t
		.service
		.soft_delete_location(&t.owner, ws, Uuid::new_v4())
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn soft_delete_covers_the_whole_subtree() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let house = t
		.service
		.create_location(&t.owner, ws, None, "House")
		.await
		.unwrap();
	let room = t
		.service
		.create_location(&t.owner, ws, Some(house.id), "Bedroom")
		.await
		.unwrap();
	let closet = t
		.service
		.create_location(&t.owner, ws, Some(room.id), "Closet")
		.await
		.unwrap();
	let shed = t
		.service
		.create_location(&t.owner, ws, None, "Shed")
		.await
		.unwrap();

	let deep = t
		.service
		.create_box(&t.owner, ws, NewBox::named("Sweaters").in_location(closet.id))
		.await
		.unwrap();
	let outside = t
		.service
		.create_box(&t.owner, ws, NewBox::named("Rakes").in_location(shed.id))
		.await
		.unwrap();

	t.service
		.soft_delete_location(&t.owner, ws, room.id)
		.await
		.unwrap();

	let deep = t.service.get_box(&t.owner, ws, deep.id).await.unwrap();
	assert_eq!(deep.storage_box.location_id, None);
	let outside = t.service.get_box(&t.owner, ws, outside.id).await.unwrap();
	assert_eq!(outside.storage_box.location_id, Some(shed.id));

	let err = t
		.service
		.get_location(&t.owner, ws, closet.id)
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);
	assert!(t
		.service
		.list_locations(&t.owner, ws, Some(house.id))
		.await
		.unwrap()
		.is_empty());

	let err = t
		.service
		.create_location(&t.owner, ws, Some(closet.id), "Drawer")
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn boxes_cannot_move_into_deleted_locations() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	let attic = t
		.service
		.create_location(&t.owner, ws, None, "Attic")
		.await
		.unwrap();
	let b = t
		.service
		.create_box(&t.owner, ws, NewBox::named("Lamps"))
		.await
		.unwrap();
	t.service
		.soft_delete_location(&t.owner, ws, attic.id)
		.await
		.unwrap();

	let err = t
		.service
		.move_box(&t.owner, ws, b.id, Some(attic.id))
		.await
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn children_are_listed_by_name() {
	let t = TestInventory::new().await;
	let ws = t.workspace_id();

	for name in ["Shed", "Attic", "Garage"] {
		t.service
			.create_location(&t.owner, ws, None, name)
			.await
			.unwrap();
	}

	let names: Vec<String> = t
		.service
		.list_locations(&t.owner, ws, None)
		.await
		.unwrap()
		.into_iter()
		.map(|l| l.name)
		.collect();
	assert_eq!(names, vec!["Attic", "Garage", "Shed"]);
}
