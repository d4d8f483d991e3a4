/* Set the uid_map of a process in a new user namespace.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 * http://www.apache.org/licenses/LICENSE-2.0
 * There is NO WARRANTY.
 *
 *     newuidmap PID UID LOWERUID COUNT [UID LOWERUID COUNT]...
 *
 * writes one line "UID LOWERUID COUNT" per triplet to
 * /proc/PID/uid_map, in a single write.  Each LOWERUID..LOWERUID+COUNT
 * range must lie inside one of the caller's /etc/subuid entries, or
 * be exactly the caller's own real uid with COUNT 1.  If any triplet
 * fails that test nothing is written at all.
 *
 * PID must belong to the caller (same real uid and gid).
 *
 * This program is to be installed setuid root (or with CAP_SETUID).
 */

fn main() {
    newidmap::main_for(newidmap::MapKind::Uid)
}
