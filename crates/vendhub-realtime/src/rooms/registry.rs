//! Room membership registry.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::ConnectionId;

use super::name::Room;

/// Tracks which connections belong to which rooms.
///
/// Keeps a forward index (room → members) for fan-out and a reverse
/// index (connection → rooms) so a connection can be removed from all
/// of its rooms in one call when it closes.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    members: DashMap<Room, HashSet<ConnectionId>>,
    rooms_by_conn: DashMap<ConnectionId, HashSet<Room>>,
}

impl RoomRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room.
    pub fn join(&self, conn_id: ConnectionId, room: Room) {
        self.members.entry(room.clone()).or_default().insert(conn_id);
        self.rooms_by_conn.entry(conn_id).or_default().insert(room);
    }

    /// Removes a connection from a room.
    pub fn leave(&self, conn_id: &ConnectionId, room: &Room) {
        if let Some(mut set) = self.members.get_mut(room) {
            set.remove(conn_id);
            if set.is_empty() {
                drop(set);
                self.members.remove(room);
            }
        }
        if let Some(mut rooms) = self.rooms_by_conn.get_mut(conn_id) {
            rooms.remove(room);
        }
    }

    /// Replaces a connection's room set, leaving rooms no longer in the
    /// target set and joining the new ones.
    pub fn set_rooms(&self, conn_id: ConnectionId, target: Vec<Room>) {
        let target: HashSet<Room> = target.into_iter().collect();
        let current = self
            .rooms_by_conn
            .get(&conn_id)
            .map(|r| r.value().clone())
            .unwrap_or_default();

        for room in current.difference(&target) {
            self.leave(&conn_id, room);
        }
        for room in target.difference(&current) {
            self.join(conn_id, room.clone());
        }
    }

    /// Removes a connection from every room it belongs to.
    pub fn remove_connection(&self, conn_id: &ConnectionId) {
        if let Some((_, rooms)) = self.rooms_by_conn.remove(conn_id) {
            for room in rooms {
                if let Some(mut set) = self.members.get_mut(&room) {
                    set.remove(conn_id);
                    if set.is_empty() {
                        drop(set);
                        self.members.remove(&room);
                    }
                }
            }
        }
    }

    /// Connection IDs currently in a room.
    pub fn room_members(&self, room: &Room) -> Vec<ConnectionId> {
        self.members
            .get(room)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Rooms a connection currently belongs to.
    pub fn rooms_of(&self, conn_id: &ConnectionId) -> Vec<Room> {
        self.rooms_by_conn
            .get(conn_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vendhub_entity::user::UserRole;

    #[test]
    fn test_join_and_leave() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let room = Room::Role(UserRole::Staff);

        registry.join(conn, room.clone());
        assert_eq!(registry.room_members(&room), vec![conn]);

        registry.leave(&conn, &room);
        assert!(registry.room_members(&room).is_empty());
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_set_rooms_diffs_membership() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        let staff = Room::Role(UserRole::Staff);
        let admin = Room::Role(UserRole::Admin);

        registry.set_rooms(conn, vec![staff.clone()]);
        registry.set_rooms(conn, vec![admin.clone()]);

        assert!(registry.room_members(&staff).is_empty());
        assert_eq!(registry.room_members(&admin), vec![conn]);
        assert_eq!(registry.rooms_of(&conn), vec![admin]);
    }

    #[test]
    fn test_remove_connection_clears_all_rooms() {
        let registry = RoomRegistry::new();
        let conn = Uuid::new_v4();
        registry.join(conn, Room::Role(UserRole::Vendor));
        registry.join(conn, Room::Location("hub".into()));

        registry.remove_connection(&conn);

        assert_eq!(registry.room_count(), 0);
        assert!(registry.rooms_of(&conn).is_empty());
    }
}
