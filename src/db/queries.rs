// users

pub const INSERT_USER: &str = r#"
INSERT INTO users (id, email, password_hash, display_name, phone_number, vehicle_type, created_at)
VALUES ($1, $2, $3, $4, $5, $6, NOW())
RETURNING id, email, password_hash, display_name, phone_number, vehicle_type, photo_url,
    cumulative_damage_score, last_maintenance_check, created_at;
"#;

pub const SELECT_USER_ID_BY_EMAIL: &str = r#"
SELECT id FROM users WHERE email = $1;
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, email, password_hash, display_name, phone_number, vehicle_type, photo_url,
    cumulative_damage_score, last_maintenance_check, created_at
FROM users WHERE email = $1;
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, email, password_hash, display_name, phone_number, vehicle_type, photo_url,
    cumulative_damage_score, last_maintenance_check, created_at
FROM users WHERE id = $1;
"#;

pub const SELECT_USER_EXISTS: &str = r#"
SELECT id FROM users WHERE id = $1;
"#;

pub const SELECT_DISPLAY_NAME: &str = r#"
SELECT display_name FROM users WHERE id = $1;
"#;

pub const ADD_DAMAGE_SCORE: &str = r#"
UPDATE users SET cumulative_damage_score = cumulative_damage_score + $2
WHERE id = $1
RETURNING cumulative_damage_score;
"#;

// hazards

pub const INSERT_HAZARD: &str = r#"
INSERT INTO hazards (
    id, reported_by, type, latitude, longitude, severity, confidence,
    image_url, description, is_verified, verification_count,
    upvotes, downvotes, is_active, created_at
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, 0, 0, 0, TRUE, NOW())
RETURNING id, reported_by, type, latitude, longitude, severity, confidence, image_url,
    description, is_verified, verification_count, upvotes, downvotes, is_active,
    resolved_at, resolved_by, created_at;
"#;

pub const SELECT_ACTIVE_HAZARDS: &str = r#"
SELECT id, reported_by, type, latitude, longitude, severity, confidence, image_url,
    description, is_verified, verification_count, upvotes, downvotes, is_active,
    resolved_at, resolved_by, created_at
FROM hazards WHERE is_active = TRUE;
"#;

pub const SELECT_ACTIVE_HAZARDS_WITH_REPORTER: &str = r#"
SELECT h.id, h.reported_by, h.type, h.latitude, h.longitude, h.severity, h.confidence,
    h.image_url, h.description, h.is_verified, h.verification_count, h.upvotes,
    h.downvotes, h.is_active, h.resolved_at, h.resolved_by, h.created_at,
    u.display_name AS reporter_name
FROM hazards h
LEFT JOIN users u ON h.reported_by = u.id
WHERE h.is_active = TRUE;
"#;

pub const SELECT_HAZARD_BY_ID: &str = r#"
SELECT h.id, h.reported_by, h.type, h.latitude, h.longitude, h.severity, h.confidence,
    h.image_url, h.description, h.is_verified, h.verification_count, h.upvotes,
    h.downvotes, h.is_active, h.resolved_at, h.resolved_by, h.created_at,
    u.display_name AS reporter_name
FROM hazards h
LEFT JOIN users u ON h.reported_by = u.id
WHERE h.id = $1;
"#;

// QueryBuilder prefix; type/severity/verified filters and LIMIT are appended.
pub const SELECT_HAZARDS_FILTERED_BASE: &str = r#"
SELECT h.id, h.reported_by, h.type, h.latitude, h.longitude, h.severity, h.confidence,
    h.image_url, h.description, h.is_verified, h.verification_count, h.upvotes,
    h.downvotes, h.is_active, h.resolved_at, h.resolved_by, h.created_at,
    u.display_name AS reporter_name
FROM hazards h
LEFT JOIN users u ON h.reported_by = u.id
WHERE h.is_active = TRUE"#;

pub const SELECT_HAZARD_REPORTER: &str = r#"
SELECT reported_by, type FROM hazards WHERE id = $1;
"#;

// hazard verification

pub const SELECT_HAZARD_FOR_VERIFY: &str = r#"
SELECT verification_count, is_verified FROM hazards WHERE id = $1 FOR UPDATE;
"#;

pub const SELECT_VERIFICATION: &str = r#"
SELECT id FROM hazard_verifications WHERE hazard_id = $1 AND verified_by = $2;
"#;

pub const INSERT_VERIFICATION: &str = r#"
INSERT INTO hazard_verifications (id, hazard_id, verified_by, verified, verified_at)
VALUES ($1, $2, $3, $4, NOW());
"#;

pub const INCREMENT_VERIFICATION_COUNT: &str = r#"
UPDATE hazards SET verification_count = verification_count + 1
WHERE id = $1
RETURNING verification_count, is_verified;
"#;

// hazard votes

pub const LOCK_HAZARD_FOR_VOTE: &str = r#"
SELECT upvotes, downvotes FROM hazards WHERE id = $1 FOR UPDATE;
"#;

pub const SELECT_VOTE: &str = r#"
SELECT vote_type FROM hazard_votes WHERE hazard_id = $1 AND user_id = $2;
"#;

pub const INSERT_VOTE: &str = r#"
INSERT INTO hazard_votes (id, hazard_id, user_id, vote_type, voted_at)
VALUES ($1, $2, $3, $4, NOW());
"#;

pub const DELETE_VOTE: &str = r#"
DELETE FROM hazard_votes WHERE hazard_id = $1 AND user_id = $2;
"#;

pub const UPDATE_VOTE_TYPE: &str = r#"
UPDATE hazard_votes SET vote_type = $3, voted_at = NOW()
WHERE hazard_id = $1 AND user_id = $2;
"#;

pub const ADD_UPVOTE: &str = r#"
UPDATE hazards SET upvotes = upvotes + 1 WHERE id = $1 RETURNING upvotes, downvotes;
"#;

pub const REMOVE_UPVOTE: &str = r#"
UPDATE hazards SET upvotes = upvotes - 1 WHERE id = $1 RETURNING upvotes, downvotes;
"#;

pub const ADD_DOWNVOTE: &str = r#"
UPDATE hazards SET downvotes = downvotes + 1 WHERE id = $1 RETURNING upvotes, downvotes;
"#;

pub const REMOVE_DOWNVOTE: &str = r#"
UPDATE hazards SET downvotes = downvotes - 1 WHERE id = $1 RETURNING upvotes, downvotes;
"#;

pub const SWITCH_TO_UPVOTE: &str = r#"
UPDATE hazards SET upvotes = upvotes + 1, downvotes = downvotes - 1
WHERE id = $1
RETURNING upvotes, downvotes;
"#;

pub const SWITCH_TO_DOWNVOTE: &str = r#"
UPDATE hazards SET upvotes = upvotes - 1, downvotes = downvotes + 1
WHERE id = $1
RETURNING upvotes, downvotes;
"#;

pub const SET_CONFIDENCE: &str = r#"
UPDATE hazards SET confidence = $2 WHERE id = $1;
"#;

pub const SELECT_VOTE_STATUS: &str = r#"
SELECT h.upvotes, h.downvotes,
    (SELECT vote_type FROM hazard_votes WHERE hazard_id = h.id AND user_id = $2) AS user_vote
FROM hazards h WHERE h.id = $1;
"#;

// hazard photos

pub const SELECT_PHOTO_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM hazard_photos WHERE hazard_id = $1);
"#;

pub const INSERT_PHOTO: &str = r#"
INSERT INTO hazard_photos (id, hazard_id, photo_url, uploaded_by, is_primary, uploaded_at)
VALUES ($1, $2, $3, $4, $5, NOW())
RETURNING id, hazard_id, photo_url, uploaded_by, is_primary, uploaded_at;
"#;

pub const SELECT_PHOTOS: &str = r#"
SELECT p.id, p.hazard_id, p.photo_url, p.uploaded_by, p.is_primary, p.uploaded_at,
    u.display_name AS uploaded_by_name
FROM hazard_photos p
LEFT JOIN users u ON p.uploaded_by = u.id
WHERE p.hazard_id = $1
ORDER BY p.is_primary DESC, p.uploaded_at DESC;
"#;

pub const SET_HAZARD_IMAGE_IF_MISSING: &str = r#"
UPDATE hazards SET image_url = $2 WHERE id = $1 AND image_url IS NULL;
"#;

// trip sessions

pub const INSERT_TRIP_SESSION: &str = r#"
INSERT INTO trip_sessions (
    id, user_id, start_latitude, start_longitude, vehicle_type,
    start_time, hazards_encountered, damage_score
) VALUES ($1, $2, $3, $4, $5, NOW(), 0, 0)
RETURNING id, user_id, start_latitude, start_longitude, end_latitude, end_longitude,
    start_time, end_time, total_distance_km, total_duration_minutes,
    hazards_encountered, damage_score, vehicle_type;
"#;

pub const SELECT_TRIP_FOR_END: &str = r#"
SELECT id, user_id, start_latitude, start_longitude, end_latitude, end_longitude,
    start_time, end_time, total_distance_km, total_duration_minutes,
    hazards_encountered, damage_score, vehicle_type
FROM trip_sessions WHERE id = $1 AND user_id = $2 AND end_time IS NULL;
"#;

pub const END_TRIP_SESSION: &str = r#"
UPDATE trip_sessions
SET end_latitude = $3,
    end_longitude = $4,
    end_time = NOW(),
    total_distance_km = $5,
    total_duration_minutes = COALESCE($6, CAST(EXTRACT(EPOCH FROM (NOW() - start_time)) / 60 AS INTEGER))
WHERE id = $1 AND user_id = $2 AND end_time IS NULL
RETURNING id, user_id, start_latitude, start_longitude, end_latitude, end_longitude,
    start_time, end_time, total_distance_km, total_duration_minutes,
    hazards_encountered, damage_score, vehicle_type;
"#;

pub const SELECT_TRIP_HISTORY: &str = r#"
SELECT id, user_id, start_latitude, start_longitude, end_latitude, end_longitude,
    start_time, end_time, total_distance_km, total_duration_minutes,
    hazards_encountered, damage_score, vehicle_type
FROM trip_sessions WHERE user_id = $1
ORDER BY start_time DESC
LIMIT $2 OFFSET $3;
"#;

pub const SELECT_TRIP_STATS: &str = r#"
SELECT COUNT(*) AS total_trips,
    COALESCE(SUM(total_distance_km), 0) AS total_distance_km,
    COALESCE(SUM(total_duration_minutes), 0) AS total_duration_minutes,
    COALESCE(SUM(hazards_encountered), 0) AS hazards_encountered,
    COALESCE(AVG(damage_score), 0) AS avg_damage_score
FROM trip_sessions WHERE user_id = $1 AND end_time IS NOT NULL;
"#;

pub const SELECT_ACTIVE_TRIP_POSITIONS: &str = r#"
SELECT user_id, start_latitude, start_longitude FROM trip_sessions WHERE end_time IS NULL;
"#;

pub const SELECT_ACTIVE_TRIP_USERS: &str = r#"
SELECT DISTINCT user_id FROM trip_sessions WHERE end_time IS NULL;
"#;

// alerts

pub const INSERT_ALERT: &str = r#"
INSERT INTO alerts (id, user_id, title, message, type, severity, hazard_id, metadata, is_read, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, NOW());
"#;

pub const SELECT_ALERTS: &str = r#"
SELECT a.id, a.user_id, a.title, a.message, a.type, a.severity, a.hazard_id,
    a.is_read, a.metadata, a.created_at, h.type AS hazard_type
FROM alerts a
LEFT JOIN hazards h ON a.hazard_id = h.id
WHERE a.user_id = $1
ORDER BY a.created_at DESC
LIMIT $2;
"#;

pub const SELECT_UNREAD_ALERTS: &str = r#"
SELECT a.id, a.user_id, a.title, a.message, a.type, a.severity, a.hazard_id,
    a.is_read, a.metadata, a.created_at, h.type AS hazard_type
FROM alerts a
LEFT JOIN hazards h ON a.hazard_id = h.id
WHERE a.user_id = $1 AND a.is_read = FALSE
ORDER BY a.created_at DESC
LIMIT $2;
"#;

pub const COUNT_UNREAD_ALERTS: &str = r#"
SELECT COUNT(*) FROM alerts WHERE user_id = $1 AND is_read = FALSE;
"#;

pub const MARK_ALERT_READ: &str = r#"
UPDATE alerts SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING id;
"#;

pub const MARK_ALL_ALERTS_READ: &str = r#"
UPDATE alerts SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE;
"#;

pub const SELECT_ALERT_STATS: &str = r#"
SELECT COUNT(*) AS total_alerts,
    COUNT(*) FILTER (WHERE is_read = FALSE) AS unread_alerts,
    COUNT(*) FILTER (WHERE severity = 'critical') AS critical_alerts,
    COUNT(*) FILTER (WHERE severity = 'emergency') AS emergency_alerts,
    COUNT(*) FILTER (WHERE type = 'proximity') AS proximity_alerts,
    COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '24 hours') AS alerts_24h
FROM alerts WHERE user_id = $1;
"#;

pub const DELETE_OLD_READ_ALERTS: &str = r#"
DELETE FROM alerts
WHERE user_id = $1 AND is_read = TRUE AND created_at < NOW() - INTERVAL '30 days';
"#;

// emergency contacts

pub const SELECT_EMERGENCY_CONTACTS: &str = r#"
SELECT id, user_id, contact_name, contact_phone, relationship, priority, is_active, created_at
FROM emergency_contacts
WHERE user_id = $1 AND is_active = TRUE
ORDER BY priority ASC, created_at ASC;
"#;

pub const INSERT_EMERGENCY_CONTACT: &str = r#"
INSERT INTO emergency_contacts (id, user_id, contact_name, contact_phone, relationship, priority, is_active, created_at)
VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW())
RETURNING id, user_id, contact_name, contact_phone, relationship, priority, is_active, created_at;
"#;

pub const UPDATE_EMERGENCY_CONTACT: &str = r#"
UPDATE emergency_contacts
SET contact_name = COALESCE($3, contact_name),
    contact_phone = COALESCE($4, contact_phone),
    relationship = COALESCE($5, relationship),
    priority = COALESCE($6, priority)
WHERE id = $1 AND user_id = $2 AND is_active = TRUE
RETURNING id, user_id, contact_name, contact_phone, relationship, priority, is_active, created_at;
"#;

pub const DELETE_EMERGENCY_CONTACT: &str = r#"
UPDATE emergency_contacts SET is_active = FALSE
WHERE id = $1 AND user_id = $2 AND is_active = TRUE
RETURNING id;
"#;

// sos alerts

pub const INSERT_SOS: &str = r#"
INSERT INTO sos_alerts (id, user_id, latitude, longitude, alert_type, message, status, triggered_at)
VALUES ($1, $2, $3, $4, $5, $6, 'active', NOW())
RETURNING id, user_id, latitude, longitude, alert_type, message, status, triggered_at, resolved_at;
"#;

pub const SELECT_SOS_FOR_USER: &str = r#"
SELECT id, user_id, latitude, longitude, alert_type, message, status, triggered_at, resolved_at
FROM sos_alerts WHERE user_id = $1
ORDER BY triggered_at DESC
LIMIT $2;
"#;

pub const SELECT_SOS_FOR_USER_BY_STATUS: &str = r#"
SELECT id, user_id, latitude, longitude, alert_type, message, status, triggered_at, resolved_at
FROM sos_alerts WHERE user_id = $1 AND status = $2
ORDER BY triggered_at DESC
LIMIT $3;
"#;

pub const UPDATE_SOS_STATUS: &str = r#"
UPDATE sos_alerts SET status = $3, resolved_at = NOW()
WHERE id = $1 AND user_id = $2 AND status = 'active'
RETURNING id, user_id, latitude, longitude, alert_type, message, status, triggered_at, resolved_at;
"#;

pub const SELECT_ACTIVE_SOS_WITH_USER: &str = r#"
SELECT s.id, s.user_id, s.latitude, s.longitude, s.alert_type, s.message, s.status,
    s.triggered_at, s.resolved_at, u.display_name, u.phone_number
FROM sos_alerts s
JOIN users u ON s.user_id = u.id
WHERE s.status = 'active'
ORDER BY s.triggered_at DESC;
"#;

// authority

pub const SELECT_AUTHORITY_BY_USER: &str = r#"
SELECT id, user_id, authority_type, jurisdiction, badge_number, department, is_verified, created_at
FROM authority_users WHERE user_id = $1;
"#;

pub const SELECT_VERIFIED_AUTHORITY_BY_USER: &str = r#"
SELECT id, user_id, authority_type, jurisdiction, badge_number, department, is_verified, created_at
FROM authority_users WHERE user_id = $1 AND is_verified = TRUE;
"#;

pub const INSERT_AUTHORITY: &str = r#"
INSERT INTO authority_users (id, user_id, authority_type, jurisdiction, badge_number, department, is_verified, created_at)
VALUES ($1, $2, $3, $4, $5, $6, FALSE, NOW())
RETURNING id, user_id, authority_type, jurisdiction, badge_number, department, is_verified, created_at;
"#;

pub const SELECT_AUTHORITY_PROFILE: &str = r#"
SELECT a.id, a.user_id, a.authority_type, a.jurisdiction, a.badge_number, a.department,
    a.is_verified, a.created_at, u.display_name, u.email, u.phone_number
FROM authority_users a
JOIN users u ON a.user_id = u.id
WHERE a.user_id = $1;
"#;

pub const INSERT_AUTHORITY_ACTION: &str = r#"
INSERT INTO hazard_authority_actions (id, hazard_id, authority_id, action_type, notes, estimated_resolution_time, action_taken_at)
VALUES ($1, $2, $3, $4, $5, $6, NOW())
RETURNING id, hazard_id, authority_id, action_type, notes, estimated_resolution_time, action_taken_at;
"#;

pub const RESOLVE_HAZARD: &str = r#"
UPDATE hazards SET is_active = FALSE, resolved_at = NOW(), resolved_by = $2 WHERE id = $1;
"#;

pub const SELECT_HAZARD_ACTIONS: &str = r#"
SELECT ha.id, ha.hazard_id, ha.authority_id, ha.action_type, ha.notes,
    ha.estimated_resolution_time, ha.action_taken_at,
    a.authority_type, a.department, u.display_name AS authority_name
FROM hazard_authority_actions ha
JOIN authority_users a ON ha.authority_id = a.id
JOIN users u ON a.user_id = u.id
WHERE ha.hazard_id = $1
ORDER BY ha.action_taken_at DESC;
"#;

// QueryBuilder prefix; severity/type filters, ORDER BY and LIMIT/OFFSET are appended.
pub const AUTHORITY_HAZARDS_BASE: &str = r#"
SELECT h.id, h.reported_by, h.type, h.latitude, h.longitude, h.severity, h.confidence,
    h.image_url, h.description, h.is_verified, h.verification_count, h.upvotes,
    h.downvotes, h.is_active, h.resolved_at, h.resolved_by, h.created_at,
    u.display_name AS reported_by_name, u.email AS reported_by_email,
    (SELECT COUNT(*) FROM hazard_verifications hv
        WHERE hv.hazard_id = h.id) AS verified_reports,
    (SELECT ha.action_type FROM hazard_authority_actions ha
        WHERE ha.hazard_id = h.id
        ORDER BY ha.action_taken_at DESC LIMIT 1) AS last_authority_action
FROM hazards h
LEFT JOIN users u ON h.reported_by = u.id
WHERE h.is_active = TRUE"#;

pub const AUTHORITY_DASHBOARD_STATS: &str = r#"
SELECT
    (SELECT COUNT(*) FROM hazards WHERE is_active = TRUE) AS total_active_hazards,
    (SELECT COUNT(*) FROM hazards WHERE is_active = TRUE
        AND severity = 'critical') AS critical_hazards,
    (SELECT COUNT(*) FROM hazard_authority_actions WHERE authority_id = $1) AS total_actions_taken,
    (SELECT COUNT(*) FROM hazards WHERE resolved_by = $2) AS hazards_resolved,
    (SELECT COUNT(*) FROM sos_alerts WHERE status = 'active') AS active_sos_alerts;
"#;

pub const ACTIVE_HAZARDS_BY_TYPE: &str = r#"
SELECT type, COUNT(*) AS count FROM hazards WHERE is_active = TRUE
GROUP BY type
ORDER BY count DESC;
"#;

pub const RECENT_AUTHORITY_ACTIONS: &str = r#"
SELECT ha.id, ha.hazard_id, ha.authority_id, ha.action_type, ha.notes,
    ha.estimated_resolution_time, ha.action_taken_at,
    h.type AS hazard_type, h.severity AS hazard_severity
FROM hazard_authority_actions ha
JOIN hazards h ON ha.hazard_id = h.id
WHERE ha.authority_id = $1
ORDER BY ha.action_taken_at DESC
LIMIT 10;
"#;

// gamification

pub const SELECT_USER_ACTIVITY_COUNTS: &str = r#"
SELECT
    (SELECT COUNT(*) FROM hazards WHERE reported_by = $1) AS reports,
    (SELECT COUNT(*) FROM hazard_verifications WHERE verified_by = $1) AS verifications,
    (SELECT COUNT(*) FROM hazard_votes WHERE user_id = $1) AS votes;
"#;

pub const UPSERT_USER_POINTS: &str = r#"
INSERT INTO user_points (user_id, total_points, level, reports_count, last_updated)
VALUES ($1, $2, $3, $4, NOW())
ON CONFLICT (user_id) DO UPDATE
SET total_points = $2,
    level = $3,
    reports_count = $4,
    last_updated = NOW();
"#;

pub const INSERT_BADGE: &str = r#"
INSERT INTO user_badges (id, user_id, badge_type, earned_at)
VALUES ($1, $2, $3, NOW())
ON CONFLICT (user_id, badge_type) DO NOTHING;
"#;

pub const SELECT_BADGES: &str = r#"
SELECT user_id, badge_type, earned_at FROM user_badges WHERE user_id = $1
ORDER BY earned_at DESC;
"#;

pub const SELECT_LEADERBOARD: &str = r#"
SELECT u.id, u.display_name,
    COALESCE(r.reports, 0) AS reports_count,
    COALESCE(vf.verifications, 0) AS verifications_count,
    COALESCE(vt.votes, 0) AS votes_count,
    (COALESCE(r.reports, 0) * 10 + COALESCE(vf.verifications, 0) * 5
        + COALESCE(vt.votes, 0) * 2) AS points
FROM users u
LEFT JOIN (SELECT reported_by, COUNT(*) AS reports FROM hazards GROUP BY reported_by) r
    ON r.reported_by = u.id
LEFT JOIN (SELECT verified_by, COUNT(*) AS verifications FROM hazard_verifications GROUP BY verified_by) vf
    ON vf.verified_by = u.id
LEFT JOIN (SELECT user_id, COUNT(*) AS votes FROM hazard_votes GROUP BY user_id) vt
    ON vt.user_id = u.id
ORDER BY points DESC, u.display_name ASC
LIMIT $1 OFFSET $2;
"#;

pub const SELECT_USER_RANK: &str = r#"
WITH scores AS (
    SELECT u.id,
        (COALESCE(r.reports, 0) * 10 + COALESCE(vf.verifications, 0) * 5
            + COALESCE(vt.votes, 0) * 2) AS points
    FROM users u
    LEFT JOIN (SELECT reported_by, COUNT(*) AS reports FROM hazards GROUP BY reported_by) r
        ON r.reported_by = u.id
    LEFT JOIN (SELECT verified_by, COUNT(*) AS verifications FROM hazard_verifications GROUP BY verified_by) vf
        ON vf.verified_by = u.id
    LEFT JOIN (SELECT user_id, COUNT(*) AS votes FROM hazard_votes GROUP BY user_id) vt
        ON vt.user_id = u.id
)
SELECT rank FROM (
    SELECT id, ROW_NUMBER() OVER (ORDER BY points DESC) AS rank FROM scores
) ranked
WHERE id = $1;
"#;

// sensor data

pub const INSERT_SENSOR_READING: &str = r#"
INSERT INTO sensor_data (
    id, trip_id, latitude, longitude,
    accelerometer_x, accelerometer_y, accelerometer_z,
    gyroscope_x, gyroscope_y, gyroscope_z,
    speed, impact_detected, recorded_at
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
RETURNING id, impact_detected, recorded_at;
"#;

// QueryBuilder prefix for the batch insert; rows are appended with push_values.
pub const INSERT_SENSOR_BATCH_BASE: &str = r#"
INSERT INTO sensor_data (
    id, trip_id, latitude, longitude,
    accelerometer_x, accelerometer_y, accelerometer_z,
    gyroscope_x, gyroscope_y, gyroscope_z,
    speed, impact_detected, recorded_at
) "#;

pub const SELECT_TRIP_IMPACTS: &str = r#"
SELECT id, latitude, longitude,
    accelerometer_x, accelerometer_y, accelerometer_z,
    speed, recorded_at
FROM sensor_data
WHERE trip_id = $1 AND impact_detected = TRUE
ORDER BY recorded_at DESC;
"#;
